// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reads `checkpad.toml` files and `CHECKPAD_*` variables into a
//! [`CheckpadConfig`].
//!
//! Every loader starts from the compiled defaults. The standard lookup then
//! layers the system file, the per-user file and the working-directory file,
//! in that order, and finally the environment.

#![allow(clippy::result_large_err)] // figment::Error is returned as-is

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CheckpadConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/checkpad/checkpad.toml";

/// File name looked up in the working directory and the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "checkpad.toml";

/// `<config dir>/checkpad/checkpad.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("checkpad").join(LOCAL_CONFIG_FILE))
}

/// Files consulted by [`load_config`], lowest precedence first. Missing
/// files are skipped when loading.
pub fn search_paths() -> Vec<PathBuf> {
    [
        Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
        user_config_path(),
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(CheckpadConfig::default()))
}

/// Loads the standard file hierarchy, then applies `CHECKPAD_*` overrides.
pub fn load_config() -> Result<CheckpadConfig, figment::Error> {
    build_figment().extract()
}

/// Parses `toml_content` over the defaults. The environment is ignored.
pub fn load_config_from_str(toml_content: &str) -> Result<CheckpadConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Loads one explicit file instead of the hierarchy. Environment overrides
/// still apply.
pub fn load_config_from_path(path: &Path) -> Result<CheckpadConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

fn env_provider() -> Env {
    Env::prefixed("CHECKPAD_").map(|key| map_env_key(key.as_str()).into())
}

/// `backend_anon_key` becomes `backend.anon_key`: only the section prefix is
/// split off, since field names contain underscores themselves.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 4] = ["backend", "session", "sync", "log"];
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("backend_anon_key"), "backend.anon_key");
        assert_eq!(map_env_key("backend_url"), "backend.url");
        assert_eq!(map_env_key("session_persist_path"), "session.persist_path");
        assert_eq!(map_env_key("sync_clear_stale_errors"), "sync.clear_stale_errors");
        assert_eq!(map_env_key("log_level"), "log.level");
        assert_eq!(map_env_key("unknown"), "unknown");
        assert_eq!(map_env_key("logger"), "logger");
    }

    #[test]
    fn working_directory_file_has_highest_precedence() {
        let paths = search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG_FILE)));
    }
}
