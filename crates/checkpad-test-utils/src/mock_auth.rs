// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock auth provider for deterministic testing.
//!
//! `MockAuthProvider` keeps its session in memory, accepts any registered
//! email/password pair, and lets tests push session events, fail lookups, or
//! hold the initial lookup open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::{broadcast, oneshot};

use checkpad_core::{
    Adapter, AdapterType, AuthEventKind, AuthProvider, CheckpadError, HealthStatus, Session,
    SessionEvent, SessionSubscription, SignUpOutcome, User, UserId,
};

/// Builds a session for `user_id` with a throwaway token.
pub fn session_for(user_id: &str) -> Session {
    Session {
        user: User {
            id: UserId(user_id.to_string()),
            email: Some(format!("{user_id}@example.com")),
        },
        access_token: SecretString::from(format!("token-{user_id}")),
        refresh_token: None,
        expires_at: None,
    }
}

#[derive(Default)]
struct State {
    session: Option<Session>,
    accounts: HashMap<String, String>,
    lookup_failure: Option<String>,
    lookup_hold: Option<oneshot::Receiver<()>>,
    sign_out_failure: Option<String>,
    confirm_sign_ups: bool,
    sign_out_calls: usize,
}

/// In-memory [`AuthProvider`].
pub struct MockAuthProvider {
    state: Mutex<State>,
    events: broadcast::Sender<SessionEvent>,
    subscribers: Arc<AtomicUsize>,
}

impl MockAuthProvider {
    /// A provider with nobody signed in.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(State::default()),
            events,
            subscribers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that starts with `user_id` signed in.
    pub fn signed_in(user_id: &str) -> Self {
        let provider = Self::new();
        provider.lock().session = Some(session_for(user_id));
        provider
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Makes `email`/`password` a valid sign-in.
    pub fn register(&self, email: &str, password: &str) {
        self.lock()
            .accounts
            .insert(email.to_string(), password.to_string());
    }

    /// Sign-ups answer with "confirmation required" instead of a session.
    pub fn require_confirmation(&self) {
        self.lock().confirm_sign_ups = true;
    }

    /// The next session lookup fails with `message`.
    pub fn fail_next_lookup(&self, message: &str) {
        self.lock().lookup_failure = Some(message.to_string());
    }

    /// The next sign-out fails with `message`.
    pub fn fail_next_sign_out(&self, message: &str) {
        self.lock().sign_out_failure = Some(message.to_string());
    }

    /// Holds the next session lookup until the returned sender fires (or is
    /// dropped). The lookup still answers with the state at the time it was
    /// made.
    pub fn hold_next_lookup(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().lookup_hold = Some(rx);
        tx
    }

    /// Replaces the session and notifies subscribers, as the real provider
    /// does on sign-in, sign-out or token refresh.
    pub fn emit(&self, kind: AuthEventKind, session: Option<Session>) {
        self.lock().session = session.clone();
        let _ = self.events.send(SessionEvent { kind, session });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.lock().sign_out_calls
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockAuthProvider {
    fn name(&self) -> &str {
        "mock-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, CheckpadError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CheckpadError> {
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, CheckpadError> {
        // The answer is read up front; a held lookup returns it late.
        let (answer, hold) = {
            let mut state = self.lock();
            let answer = match state.lookup_failure.take() {
                Some(message) => Err(CheckpadError::auth(message)),
                None => Ok(state.session.clone()),
            };
            (answer, state.lookup_hold.take())
        };
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        answer
    }

    fn subscribe(&self) -> SessionSubscription {
        let counter = self.subscribers.clone();
        counter.fetch_add(1, Ordering::SeqCst);
        SessionSubscription::new(self.events.subscribe(), move || {
            counter.fetch_sub(1, Ordering::SeqCst);
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, CheckpadError> {
        let known = self.lock().accounts.get(email).cloned();
        if known.as_deref() != Some(password) {
            return Err(CheckpadError::auth("Invalid login credentials"));
        }
        let session = session_for(email.split('@').next().unwrap_or(email));
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, CheckpadError> {
        let confirm = {
            let mut state = self.lock();
            if state.accounts.contains_key(email) {
                return Err(CheckpadError::auth("User already registered"));
            }
            state
                .accounts
                .insert(email.to_string(), password.to_string());
            state.confirm_sign_ups
        };
        if confirm {
            return Ok(SignUpOutcome::ConfirmationRequired);
        }
        let session = session_for(email.split('@').next().unwrap_or(email));
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> Result<(), CheckpadError> {
        let failure = {
            let mut state = self.lock();
            state.sign_out_calls += 1;
            state.sign_out_failure.take()
        };
        if let Some(message) = failure {
            return Err(CheckpadError::auth(message));
        }
        self.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }
}
