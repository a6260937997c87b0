// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Checkpad.
//!
//! This crate provides the domain types (sessions, checklists, tasks), the
//! error type, row decoding, progress derivation, and the adapter traits
//! through which the sync core talks to the auth provider and the data store.

pub mod error;
pub mod progress;
pub mod rows;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CheckpadError;
pub use progress::{Progress, ProgressTier, clamp_percentage, completion_percentage};
pub use types::{
    AdapterType, AuthEventKind, Checklist, ChecklistId, Entity, HealthStatus, Row, SelectQuery,
    Session, SessionEvent, SignUpOutcome, Task, TaskId, User, UserId,
};

pub use traits::{Adapter, AuthProvider, DataStore, SessionSubscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpad_error_has_all_variants() {
        let _config = CheckpadError::Config("test".into());
        let _auth = CheckpadError::Auth {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _store = CheckpadError::Store {
            message: "test".into(),
            source: None,
        };
        let _row = CheckpadError::MalformedRow {
            entity: Entity::Tasks,
            reason: "test".into(),
        };
        let _conflict = CheckpadError::Conflict {
            entity: Entity::Tasks,
            id: 1,
        };
        let _internal = CheckpadError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Auth, AdapterType::Store] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_adapter<T: Adapter>() {}
        fn _assert_auth_provider<T: AuthProvider>() {}
        fn _assert_data_store<T: DataStore>() {}
    }
}
