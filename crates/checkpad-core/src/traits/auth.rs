// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication provider trait and the subscription handle it hands out.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::CheckpadError;
use crate::traits::adapter::Adapter;
use crate::types::{Session, SessionEvent, SignUpOutcome};

/// Adapter for the authentication provider.
///
/// The provider owns session creation, persistence and expiry. Consumers
/// only read the current session and observe transitions.
#[async_trait]
pub trait AuthProvider: Adapter {
    /// Returns the current session, restoring persisted state if needed.
    async fn current_session(&self) -> Result<Option<Session>, CheckpadError>;

    /// Registers for session transitions (sign-in, sign-out, token refresh).
    fn subscribe(&self) -> SessionSubscription;

    /// Signs in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, CheckpadError>;

    /// Registers a new account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, CheckpadError>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), CheckpadError>;
}

type ReleaseFn = Box<dyn FnOnce() + Send + 'static>;

/// A live registration for session events.
///
/// The registration is released exactly once: either by
/// [`unsubscribe`](Self::unsubscribe), which consumes the handle, or on drop.
pub struct SessionSubscription {
    events: broadcast::Receiver<SessionEvent>,
    release: Option<ReleaseFn>,
}

impl SessionSubscription {
    /// Wraps a receiver together with a release hook run on unsubscribe.
    pub fn new(
        events: broadcast::Receiver<SessionEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Waits for the next session event.
    pub async fn recv(&mut self) -> Result<SessionEvent, broadcast::error::RecvError> {
        self.events.recv().await
    }

    /// Releases the registration.
    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl std::fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("released", &self.release.is_none())
            .finish()
    }
}
