// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CheckpadConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &CheckpadConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let url = config.backend.url.trim();
    if url.is_empty() {
        invalid("backend.url must not be empty".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        invalid(format!("backend.url `{url}` must start with http:// or https://"));
    }

    if let Some(key) = &config.backend.anon_key
        && key.trim().is_empty()
    {
        invalid("backend.anon_key must not be empty when set".to_string());
    }

    if config.backend.request_timeout_secs == 0 {
        invalid("backend.request_timeout_secs must be at least 1".to_string());
    }

    if config.session.persist && config.session.persist_path.trim().is_empty() {
        invalid("session.persist_path must not be empty when session.persist is on".to_string());
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &CheckpadConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&CheckpadConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let mut config = CheckpadConfig::default();
        config.backend.url = "ftp://example.com".into();
        let errors = messages(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("backend.url"), "got: {errors:?}");
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CheckpadConfig::default();
        config.backend.url = "".into();
        config.backend.anon_key = Some("  ".into());
        config.backend.request_timeout_secs = 0;
        config.log.level = "loud".into();
        assert_eq!(messages(&config).len(), 4);
    }

    #[test]
    fn empty_persist_path_only_matters_when_persisting() {
        let mut config = CheckpadConfig::default();
        config.session.persist_path = "".into();
        assert!(validate_config(&config).is_err());

        config.session.persist = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = CheckpadConfig::default();
        config.log.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
