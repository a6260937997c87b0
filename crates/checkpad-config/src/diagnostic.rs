// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config problems as miette diagnostics.
//!
//! A misspelled key is pointed at in the file it came from, together with
//! the closest setting of that section.

#![allow(unused_assignments)] // emitted by the Diagnostic derive

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a known key needs before it is offered as a fix.
const MIN_SIMILARITY: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a checkpad setting")]
    #[diagnostic(
        code(checkpad::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Settings of the same section, comma separated.
        valid_keys: String,
        #[label("unknown setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(checkpad::config::invalid_type), help("this setting takes {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `backend.request_timeout_secs`.
        key: String,
        detail: String,
        expected: String,
    },

    /// Parsed, but rejected by [`validate_config`](crate::validation::validate_config).
    #[error("invalid setting: {message}")]
    #[diagnostic(code(checkpad::config::validation))]
    Validation { message: String },

    /// Unreadable files, TOML syntax errors and the like.
    #[error("could not load configuration: {0}")]
    #[diagnostic(code(checkpad::config::load))]
    Load(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? this section accepts: {valid_keys}"),
        None => format!("this section accepts: {valid_keys}"),
    }
}

/// One [`ConfigError`] per problem figment found.
///
/// `sources` pairs file paths with their contents; an unknown key found in
/// one of them gets a span into it.
pub fn diagnose(err: figment::Error, sources: &[(String, String)]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::from_figment(error, sources))
        .collect()
}

impl ConfigError {
    fn from_figment(error: FigmentError, sources: &[(String, String)]) -> Self {
        match &error.kind {
            Kind::UnknownField(key, accepted) => {
                let (span, src) = locate(&error, key, sources).unzip();
                ConfigError::UnknownKey {
                    key: key.clone(),
                    suggestion: closest_key(key, accepted),
                    valid_keys: accepted.join(", "),
                    span,
                    src,
                }
            }
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("got {found}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Load(error.to_string()),
        }
    }
}

/// Finds `key` in the file figment says the error came from.
fn locate(
    error: &FigmentError,
    key: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(path) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let path = path.display().to_string();
    let (name, content) = sources.iter().find(|(p, _)| *p == path)?;
    let offset = key_offset(content, error.path.first().map(String::as_str), key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of an assignment to `key`, searched from the `[section]`
/// header on, or from the top of the file when `section` is `None`.
pub fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let start = match section {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let assigns_key = line[indent..]
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns_key {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The accepted key most similar to `unknown`, if any is similar enough.
pub fn closest_key(unknown: &str, accepted: &[&str]) -> Option<String> {
    accepted
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr as a graphical miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        if handler.render_report(&mut report, error).is_ok() {
            eprint!("{report}");
        } else {
            eprintln!("error: {error}");
        }
    }
}
