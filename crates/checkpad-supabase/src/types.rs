// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the auth API and the persisted session file.

use chrono::{DateTime, Utc};
use checkpad_core::{Session, User, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Error body returned by the auth and REST APIs.
///
/// The two services disagree on the field carrying the message, so every
/// known spelling is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The most descriptive message present, if any.
    pub fn description(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Credentials posted to the token and signup endpoints.
#[derive(Debug, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for the refresh-token grant.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// The user object embedded in auth responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful token grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl TokenResponse {
    /// Converts the grant into a session, computing the expiry from
    /// `expires_at` or, failing that, `now + expires_in`.
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| now + chrono::Duration::seconds(secs))
            });
        Session {
            user: User {
                id: UserId(self.user.id),
                email: self.user.email,
            },
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            expires_at,
        }
    }
}

/// On-disk form of a session.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: AuthUser,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user: AuthUser {
                id: session.user.id.0.clone(),
                email: session.user.email.clone(),
            },
            access_token: session.access_token.expose_secret().to_string(),
            refresh_token: session
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
            expires_at: session.expires_at,
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(p: PersistedSession) -> Self {
        Session {
            user: User {
                id: UserId(p.user.id),
                email: p.user.email,
            },
            access_token: SecretString::from(p.access_token),
            refresh_token: p.refresh_token.map(SecretString::from),
            expires_at: p.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn error_body_prefers_message_then_msg() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"msg": "short", "error": "invalid_grant"}"#).unwrap();
        assert_eq!(body.description().as_deref(), Some("short"));

        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.description().as_deref(), Some("Invalid login credentials"));

        assert!(ApiErrorBody::default().description().is_none());
    }

    #[test]
    fn token_response_uses_expires_in_when_absolute_expiry_missing() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let grant: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": {"id": "u-1", "email": "a@b.c"}
        }))
        .unwrap();

        let session = grant.into_session(now);
        assert_eq!(session.user.id, UserId("u-1".into()));
        assert_eq!(session.expires_at, Some(now + chrono::Duration::hours(1)));
        assert_eq!(session.access_token.expose_secret(), "at");
    }

    #[test]
    fn persisted_session_round_trip_keeps_tokens() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let session = Session {
            user: User {
                id: UserId("u-9".into()),
                email: Some("x@y.z".into()),
            },
            access_token: SecretString::from("at"),
            refresh_token: Some(SecretString::from("rt")),
            expires_at: Some(now),
        };
        let json = serde_json::to_string(&PersistedSession::from(&session)).unwrap();
        let restored: Session = serde_json::from_str::<PersistedSession>(&json).unwrap().into();

        assert_eq!(restored.user, session.user);
        assert_eq!(restored.refresh_token.unwrap().expose_secret(), "rt");
        assert_eq!(restored.expires_at, Some(now));
    }
}
