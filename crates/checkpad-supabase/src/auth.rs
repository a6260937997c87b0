// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth provider backed by the GoTrue-style `/auth/v1` API.
//!
//! [`SupabaseAuth`] owns the current session. It restores a persisted session
//! on first lookup, refreshes it when expired, and broadcasts every
//! transition to subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use chrono::Utc;
use checkpad_core::{
    Adapter, AdapterType, AuthEventKind, AuthProvider, CheckpadError, HealthStatus, Session,
    SessionEvent, SessionSubscription, SignUpOutcome,
};
use secrecy::ExposeSecret;
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, info, warn};

use crate::client::{SupabaseClient, error_description};
use crate::persist::SessionFile;
use crate::types::{PasswordCredentials, RefreshRequest, TokenResponse};

/// Session slot shared between the auth provider and the REST store, which
/// reads the bearer token from it.
pub type SessionSlot = Arc<ArcSwapOption<Session>>;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Auth provider for a Supabase-style backend.
pub struct SupabaseAuth {
    client: SupabaseClient,
    current: SessionSlot,
    events: broadcast::Sender<SessionEvent>,
    subscribers: Arc<AtomicUsize>,
    persist: Option<SessionFile>,
    restored: OnceCell<()>,
}

impl SupabaseAuth {
    /// Creates a provider. With `persist` set, the session survives restarts.
    pub fn new(client: SupabaseClient, persist: Option<SessionFile>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            current: Arc::new(ArcSwapOption::empty()),
            events,
            subscribers: Arc::new(AtomicUsize::new(0)),
            persist,
            restored: OnceCell::new(),
        }
    }

    /// The slot holding the current session, for sharing with the store.
    pub fn session_slot(&self) -> SessionSlot {
        self.current.clone()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    async fn restore_once(&self) {
        self.restored
            .get_or_init(|| async {
                if self.current.load().is_some() {
                    return;
                }
                if let Some(file) = &self.persist
                    && let Some(session) = file.load().await
                {
                    info!(user_id = %session.user.id, "session restored from disk");
                    self.current.store(Some(Arc::new(session)));
                }
            })
            .await;
    }

    /// Installs `session` as current, persists it and notifies subscribers.
    async fn install(&self, kind: AuthEventKind, session: Session) {
        if let Some(file) = &self.persist
            && let Err(e) = file.save(&session).await
        {
            warn!(error = %e, "failed to persist session");
        }
        self.current.store(Some(Arc::new(session.clone())));
        info!(user_id = %session.user.id, event = %kind, "session changed");
        self.publish(kind, Some(session));
    }

    /// Drops the current session everywhere and notifies subscribers.
    async fn discard(&self) {
        if let Some(file) = &self.persist
            && let Err(e) = file.clear().await
        {
            warn!(error = %e, "failed to remove persisted session");
        }
        self.current.store(None);
        info!(event = %AuthEventKind::SignedOut, "session changed");
        self.publish(AuthEventKind::SignedOut, None);
    }

    fn publish(&self, kind: AuthEventKind, session: Option<Session>) {
        // No receivers is fine: nobody is listening yet.
        let _ = self.events.send(SessionEvent { kind, session });
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, CheckpadError> {
        let mut url = self.client.endpoint("/auth/v1/token");
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .client
            .http()
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        debug!(status = %status, grant_type, "token response received");
        if !status.is_success() {
            return Err(CheckpadError::auth(error_description(response).await));
        }

        let grant: TokenResponse = response.json().await.map_err(|e| CheckpadError::Auth {
            message: format!("failed to parse token response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(grant.into_session(Utc::now()))
    }

    async fn refresh(&self, session: &Session) -> Option<Session> {
        let token = session.refresh_token.as_ref()?;
        let body = RefreshRequest {
            refresh_token: token.expose_secret(),
        };
        match self.token_grant("refresh_token", &body).await {
            Ok(fresh) => Some(fresh),
            Err(e) => {
                warn!(error = %e, "session refresh failed");
                None
            }
        }
    }
}

fn network_error(e: reqwest::Error) -> CheckpadError {
    CheckpadError::Auth {
        message: format!("network error: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl Adapter for SupabaseAuth {
    fn name(&self) -> &str {
        "supabase-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckpadError> {
        let request = self.client.http().get(self.client.endpoint("/auth/v1/health"));
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Ok(HealthStatus::Unhealthy(format!("network error: {e}"))),
        };
        if response.status().is_success() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(error_description(response).await))
        }
    }

    async fn shutdown(&self) -> Result<(), CheckpadError> {
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    /// Returns the current session, restoring it from disk on first use and
    /// refreshing it if the access token has expired. A session that cannot
    /// be refreshed is dropped and reported as a sign-out.
    async fn current_session(&self) -> Result<Option<Session>, CheckpadError> {
        self.restore_once().await;

        let Some(session) = self.current.load_full() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some((*session).clone()));
        }

        debug!(user_id = %session.user.id, "access token expired, refreshing");
        match self.refresh(&session).await {
            Some(fresh) => {
                self.install(AuthEventKind::TokenRefreshed, fresh.clone())
                    .await;
                Ok(Some(fresh))
            }
            None => {
                self.discard().await;
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> SessionSubscription {
        let receiver = self.events.subscribe();
        let counter = self.subscribers.clone();
        counter.fetch_add(1, Ordering::SeqCst);
        SessionSubscription::new(receiver, move || {
            counter.fetch_sub(1, Ordering::SeqCst);
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, CheckpadError> {
        let session = self
            .token_grant("password", &PasswordCredentials { email, password })
            .await?;
        self.install(AuthEventKind::SignedIn, session.clone()).await;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, CheckpadError> {
        let response = self
            .client
            .http()
            .post(self.client.endpoint("/auth/v1/signup"))
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(CheckpadError::auth(error_description(response).await));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| CheckpadError::Auth {
            message: format!("failed to parse signup response: {e}"),
            source: Some(Box::new(e)),
        })?;

        // With email confirmation on, the response is the bare user object.
        if body.get("access_token").is_none() {
            info!(email, "signup requires email confirmation");
            return Ok(SignUpOutcome::ConfirmationRequired);
        }

        let grant: TokenResponse = serde_json::from_value(body).map_err(|e| CheckpadError::Auth {
            message: format!("failed to parse signup session: {e}"),
            source: Some(Box::new(e)),
        })?;
        let session = grant.into_session(Utc::now());
        self.install(AuthEventKind::SignedIn, session.clone()).await;
        Ok(SignUpOutcome::SignedIn(session))
    }

    /// Revokes the session server-side and forgets it locally. A token the
    /// server no longer recognizes still counts as signed out.
    async fn sign_out(&self) -> Result<(), CheckpadError> {
        self.restore_once().await;

        if let Some(session) = self.current.load_full() {
            let response = self
                .client
                .http()
                .post(self.client.endpoint("/auth/v1/logout"))
                .bearer_auth(session.access_token.expose_secret())
                .send()
                .await
                .map_err(network_error)?;

            let status = response.status().as_u16();
            if !response.status().is_success() && !matches!(status, 401 | 403 | 404) {
                return Err(CheckpadError::auth(error_description(response).await));
            }
        }

        self.discard().await;
        Ok(())
    }
}
