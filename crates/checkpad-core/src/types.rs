// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain and adapter types shared across the Checkpad workspace.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier of a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChecklistId(pub i64);

/// Server-assigned identifier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub i64);

/// The user an authenticated session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
}

/// An authenticated session issued by the auth provider.
///
/// Tokens are wrapped in [`SecretString`] so they never show up in
/// `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns the id of the user this session is bound to.
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// Whether the access token has expired at `now`. Sessions without an
    /// expiry never expire client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Kind of session transition reported by the auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A session transition pushed by the auth provider to its subscribers.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

/// Result of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The provider signed the new user in immediately.
    SignedIn(Session),
    /// The provider sent a confirmation link; no session yet.
    ConfirmationRequired,
}

/// A task belonging to a checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub checklist_id: ChecklistId,
    pub title: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

/// A named checklist together with its tasks, as returned by the last fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist {
    pub id: ChecklistId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl Checklist {
    /// Number of tasks marked complete.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_complete).count()
    }

    /// Finds a task of this checklist by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Store entities addressed by name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Checklists,
    Tasks,
}

impl Entity {
    /// Column that child rows use to reference a row of this entity.
    pub fn foreign_key(&self) -> &'static str {
        match self {
            Entity::Checklists => "checklist_id",
            Entity::Tasks => "task_id",
        }
    }
}

/// A raw row exchanged with the data store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single ordering clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// An equality filter on a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: serde_json::Value,
}

/// Child rows embedded in each parent row of a select.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSelect {
    pub entity: Entity,
    pub order: Vec<Order>,
}

impl NestedSelect {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            order: Vec::new(),
        }
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }
}

/// A filtered, ordered read against one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub entity: Entity,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub nested: Option<NestedSelect>,
}

impl SelectQuery {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filters: Vec::new(),
            order: Vec::new(),
            nested: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<serde_json::Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn with_nested(mut self, nested: NestedSelect) -> Self {
        self.nested = Some(nested);
        self
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Auth,
    Store,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(expires_at: Option<DateTime<Utc>>) -> Session {
        Session {
            user: User {
                id: UserId("u-1".into()),
                email: None,
            },
            access_token: SecretString::from("token"),
            refresh_token: None,
            expires_at,
        }
    }

    #[test]
    fn session_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert!(!session(None).is_expired(now));
        assert!(session(Some(now)).is_expired(now));
        assert!(!session(Some(now + chrono::Duration::minutes(5))).is_expired(now));
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let debug = format!("{:?}", session(None));
        assert!(!debug.contains("\"token\""), "got: {debug}");
    }

    #[test]
    fn entity_names_match_table_names() {
        use std::str::FromStr;

        assert_eq!(Entity::Checklists.to_string(), "checklists");
        assert_eq!(Entity::Tasks.to_string(), "tasks");
        assert_eq!(Entity::from_str("tasks").unwrap(), Entity::Tasks);
        assert_eq!(Entity::Checklists.foreign_key(), "checklist_id");
    }

    #[test]
    fn select_query_builder_accumulates_clauses() {
        let query = SelectQuery::new(Entity::Checklists)
            .eq("user_id", "u-1")
            .order_by("created_at", Direction::Descending)
            .with_nested(
                NestedSelect::new(Entity::Tasks).order_by("created_at", Direction::Ascending),
            );

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, serde_json::json!("u-1"));
        assert_eq!(query.order[0].direction, Direction::Descending);
        let nested = query.nested.unwrap();
        assert_eq!(nested.entity, Entity::Tasks);
        assert_eq!(nested.order[0].direction, Direction::Ascending);
    }
}
