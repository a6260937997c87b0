// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Checkpad.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Checkpad configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpadConfig {
    /// Backend (auth + data API) connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session persistence settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Checklist synchronization behavior.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend project, e.g. `https://xyz.supabase.co`.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Public (anon) API key. `None` requires environment variable.
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            anon_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:54321".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Session persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Persist the session between runs so it can be restored at startup.
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Where the persisted session lives.
    #[serde(default = "default_persist_path")]
    pub persist_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            persist_path: default_persist_path(),
        }
    }
}

fn default_persist() -> bool {
    true
}

fn default_persist_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("checkpad").join("session.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("checkpad-session.json"))
        .to_string_lossy()
        .into_owned()
}

/// Checklist synchronization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Clear the error slot once a later mutation and its reload succeed.
    /// `false` keeps a stale error visible until another error replaces it.
    #[serde(default = "default_clear_stale_errors")]
    pub clear_stale_errors: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            clear_stale_errors: default_clear_stale_errors(),
        }
    }
}

fn default_clear_stale_errors() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
