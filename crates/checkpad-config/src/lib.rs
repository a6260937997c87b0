// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings for the Checkpad client: where the backend lives, how the
//! session is kept between runs, synchronizer switches and the log level.
//!
//! Unknown keys are rejected. Problems come back as [`ConfigError`]s, which
//! render as miette reports pointing into the offending file.
//!
//! ```no_run
//! use checkpad_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("backend: {}", config.backend.url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CheckpadConfig;

/// Validates a loaded config, or explains why loading failed.
///
/// `sources` is only read on failure; it supplies the file contents that
/// diagnostics point into.
fn checked(
    loaded: Result<CheckpadConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<CheckpadConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::diagnose(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Loads the standard hierarchy with env overrides and validates it.
pub fn load_and_validate() -> Result<CheckpadConfig, Vec<ConfigError>> {
    checked(loader::load_config(), existing_sources)
}

pub fn load_and_validate_str(toml_content: &str) -> Result<CheckpadConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Loads one explicit file with env overrides and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<CheckpadConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Contents of every config file that exists, keyed by the path figment
/// reports for it.
fn existing_sources() -> Vec<(String, String)> {
    loader::search_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|dir| dir.join(&path))
                    .unwrap_or(path)
            } else {
                path
            };
            Some((shown.display().to_string(), content))
        })
        .collect()
}
