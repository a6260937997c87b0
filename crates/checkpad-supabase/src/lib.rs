// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supabase-style backend adapters for Checkpad.
//!
//! This crate implements [`AuthProvider`](checkpad_core::AuthProvider) against
//! the GoTrue `/auth/v1` API and [`DataStore`](checkpad_core::DataStore)
//! against PostgREST. Both share one HTTP client and one session slot, so
//! store requests always carry the current access token.

pub mod auth;
pub mod client;
pub mod persist;
pub mod rest;
pub mod types;

use std::sync::Arc;

use checkpad_config::model::CheckpadConfig;
use checkpad_core::{Adapter, CheckpadError};
use tracing::info;

pub use crate::auth::{SessionSlot, SupabaseAuth};
pub use crate::client::SupabaseClient;
pub use crate::persist::SessionFile;
pub use crate::rest::PostgrestStore;

/// The auth provider and data store for one backend project.
pub struct Backend {
    pub auth: Arc<SupabaseAuth>,
    pub store: Arc<PostgrestStore>,
}

impl Backend {
    /// Builds both adapters from configuration.
    pub fn from_config(config: &CheckpadConfig) -> Result<Self, CheckpadError> {
        let client = SupabaseClient::from_config(&config.backend)?;
        let persist = config
            .session
            .persist
            .then(|| SessionFile::new(&config.session.persist_path));

        let auth = SupabaseAuth::new(client.clone(), persist);
        let store = PostgrestStore::new(client, auth.session_slot());

        info!(
            url = %config.backend.url,
            auth = auth.name(),
            store = store.name(),
            persist = config.session.persist,
            "backend adapters initialized"
        );

        Ok(Self {
            auth: Arc::new(auth),
            store: Arc::new(store),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpad_core::AdapterType;

    #[test]
    fn from_config_wires_both_adapters() {
        let mut config = CheckpadConfig::default();
        config.backend.anon_key = Some("anon".into());
        config.session.persist = false;

        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.auth.adapter_type(), AdapterType::Auth);
        assert_eq!(backend.store.adapter_type(), AdapterType::Store);
    }

    #[test]
    fn from_config_without_anon_key_fails() {
        let config = CheckpadConfig::default();
        assert!(matches!(
            Backend::from_config(&config),
            Err(CheckpadError::Config(_))
        ));
    }
}
