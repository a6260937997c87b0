// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Checkpad configuration system.

use std::io::Write;

use checkpad_config::diagnostic::ConfigError;
use checkpad_config::model::CheckpadConfig;
use checkpad_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_checkpad_config() {
    let toml = r#"
[backend]
url = "https://demo.supabase.co"
anon_key = "anon-123"
request_timeout_secs = 5

[session]
persist = false
persist_path = "/tmp/checkpad-session.json"

[sync]
clear_stale_errors = false

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.backend.url, "https://demo.supabase.co");
    assert_eq!(config.backend.anon_key.as_deref(), Some("anon-123"));
    assert_eq!(config.backend.request_timeout_secs, 5);
    assert!(!config.session.persist);
    assert_eq!(config.session.persist_path, "/tmp/checkpad-session.json");
    assert!(!config.sync.clear_stale_errors);
    assert_eq!(config.log.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.backend.url, "http://127.0.0.1:54321");
    assert!(config.backend.anon_key.is_none());
    assert_eq!(config.backend.request_timeout_secs, 30);
    assert!(config.session.persist);
    assert!(config.session.persist_path.ends_with("session.json"));
    assert!(config.sync.clear_stale_errors);
    assert_eq!(config.log.level, "info");
}

/// Unknown keys are rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_backend_is_rejected() {
    let toml = r#"
[backend]
anon_kye = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("anon_kye"),
        "error should mention the unknown field, got: {err_str}"
    );
}

/// Unknown key becomes a diagnostic with a suggestion and a source span.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = "[backend]\nanon_kye = \"abc\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "anon_kye");
            assert_eq!(suggestion.as_deref(), Some("anon_key"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Type mismatches are reported with the dotted key path.
#[test]
fn wrong_type_is_reported() {
    let toml = "[backend]\nrequest_timeout_secs = \"soon\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("request_timeout_secs"))),
        "got: {errors:?}"
    );
}

/// Broken TOML is reported as a load failure rather than a key problem.
#[test]
fn syntax_error_is_a_load_failure() {
    let errors = load_and_validate_str("[backend\nurl = ").expect_err("should fail");
    assert!(matches!(errors[0], ConfigError::Load(_)), "got: {errors:?}");
    assert!(errors[0].to_string().starts_with("could not load configuration"));
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let toml = "[log]\nlevel = \"chatty\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Dotted overrides (what env vars map to) win over file values.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: CheckpadConfig = Figment::new()
        .merge(Serialized::defaults(CheckpadConfig::default()))
        .merge(Toml::string("[backend]\nanon_key = \"from-toml\"\n"))
        .merge(("backend.anon_key", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.backend.anon_key.as_deref(), Some("from-env"));
}

/// Loading from an explicit path reads and validates the file.
#[test]
fn load_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[backend]\nurl = \"https://example.test\"").unwrap();

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.backend.url, "https://example.test");
}
