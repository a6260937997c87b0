// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Checkpad.

use thiserror::Error;

use crate::types::Entity;

/// The primary error type used across the adapter traits and the sync core.
#[derive(Debug, Error)]
pub enum CheckpadError {
    /// Configuration errors (invalid TOML, missing backend URL, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication provider errors (bad credentials, provider unreachable).
    #[error("auth error: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Data store errors (network, authorization, constraint violation).
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A row returned by the store did not have the expected shape.
    #[error("malformed {entity} row: {reason}")]
    MalformedRow { entity: Entity, reason: String },

    /// A guarded update matched no row because the row changed underneath us.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: Entity, id: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckpadError {
    /// Shorthand for a store error without an underlying source.
    pub fn store(message: impl Into<String>) -> Self {
        CheckpadError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an auth error without an underlying source.
    pub fn auth(message: impl Into<String>) -> Self {
        CheckpadError::Auth {
            message: message.into(),
            source: None,
        }
    }

    /// The description shown to the user in an error slot.
    ///
    /// For backend failures this is the backend's own message, without the
    /// variant prefix that `Display` adds.
    pub fn user_message(&self) -> String {
        match self {
            CheckpadError::Auth { message, .. } | CheckpadError::Store { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
