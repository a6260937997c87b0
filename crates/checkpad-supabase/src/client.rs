// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP client for the backend's auth and REST endpoints.
//!
//! Provides [`SupabaseClient`], which owns the connection pool, the `apikey`
//! default header and the request timeout, and turns error responses into
//! readable messages. Nothing is retried here.

use std::time::Duration;

use checkpad_config::model::BackendConfig;
use checkpad_core::CheckpadError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, Url};
use tracing::debug;

use crate::types::ApiErrorBody;

/// HTTP client bound to one backend project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// Proxies configured in the environment are honoured.
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, CheckpadError> {
        Self::with_builder(base_url, anon_key, reqwest::Client::builder().timeout(timeout))
    }

    /// Like [`new`](Self::new) but always connects directly, ignoring any
    /// proxy settings.
    #[cfg(test)]
    pub(crate) fn direct(
        base_url: &str,
        anon_key: &str,
        timeout: Duration,
    ) -> Result<Self, CheckpadError> {
        Self::with_builder(
            base_url,
            anon_key,
            reqwest::Client::builder().timeout(timeout).no_proxy(),
        )
    }

    fn with_builder(
        base_url: &str,
        anon_key: &str,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, CheckpadError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| CheckpadError::Config(format!("invalid backend URL `{base_url}`: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key).map_err(|e| {
                CheckpadError::Config(format!("invalid anon key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = builder
            .default_headers(headers)
            .build()
            .map_err(|e| CheckpadError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Creates a client from the `[backend]` config section.
    ///
    /// The anon key is required; it may come from the config file or the
    /// `CHECKPAD_BACKEND_ANON_KEY` environment variable.
    pub fn from_config(config: &BackendConfig) -> Result<Self, CheckpadError> {
        let anon_key = config.anon_key.as_deref().ok_or_else(|| {
            CheckpadError::Config(
                "backend.anon_key is not set (config file or CHECKPAD_BACKEND_ANON_KEY)".into(),
            )
        })?;
        Self::new(
            &config.url,
            anon_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Absolute URL for `path` (e.g. `/rest/v1/tasks`) under the project.
    pub(crate) fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }
}

/// Reads an error response into a human-readable description.
///
/// Uses the backend's own message when the body carries one, otherwise the
/// status and raw body.
pub(crate) async fn error_description(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %body, "backend returned an error");

    serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::description)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("backend returned {status}")
            } else {
                format!("backend returned {status}: {body}")
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths_under_base() {
        let client =
            SupabaseClient::new("https://demo.supabase.co/", "anon", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.endpoint("/rest/v1/tasks").as_str(),
            "https://demo.supabase.co/rest/v1/tasks"
        );

        let client =
            SupabaseClient::new("http://localhost:8000/proxy", "anon", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.endpoint("/auth/v1/token").as_str(),
            "http://localhost:8000/proxy/auth/v1/token"
        );
    }

    #[test]
    fn rejects_bad_url_and_key() {
        assert!(matches!(
            SupabaseClient::new("not a url", "anon", Duration::from_secs(1)),
            Err(CheckpadError::Config(_))
        ));
        assert!(matches!(
            SupabaseClient::new("https://x.test", "bad\nkey", Duration::from_secs(1)),
            Err(CheckpadError::Config(_))
        ));
    }

    #[test]
    fn from_config_requires_anon_key() {
        let config = BackendConfig::default();
        let err = SupabaseClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("anon_key"), "got: {err}");

        let config = BackendConfig {
            anon_key: Some("anon".into()),
            ..BackendConfig::default()
        };
        assert!(SupabaseClient::from_config(&config).is_ok());
    }
}
