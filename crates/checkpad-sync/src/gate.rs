// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session gate: the single owner of process-wide authentication state.
//!
//! [`SessionGate::start`] subscribes to the auth provider, resolves the
//! initial session and then follows every transition the provider pushes.
//! Everything else observes the state through a read-only [`SessionView`].

use std::sync::Arc;

use checkpad_core::{AuthProvider, CheckpadError, Session, SessionEvent, User, UserId};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Authentication state as known to the client.
#[derive(Debug, Clone, Default)]
pub enum GateState {
    /// The initial lookup has not answered yet.
    #[default]
    Unknown,
    Authenticated(Session),
    Unauthenticated,
}

impl GateState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            GateState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, GateState::Unknown)
    }

    pub fn route(&self) -> Route {
        match self {
            GateState::Unknown => Route::Loading,
            GateState::Authenticated(_) => Route::Protected,
            GateState::Unauthenticated => Route::Public,
        }
    }

    fn from_session(session: Option<Session>) -> Self {
        match session {
            Some(session) => GateState::Authenticated(session),
            None => GateState::Unauthenticated,
        }
    }
}

/// Which screen the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Still resolving; show a loading indicator.
    Loading,
    /// No session; show the sign-in form.
    Public,
    /// Signed in; show the dashboard.
    Protected,
}

/// Read-only handle on the gate's state.
#[derive(Debug, Clone)]
pub struct SessionView {
    rx: watch::Receiver<GateState>,
}

impl SessionView {
    pub fn state(&self) -> GateState {
        self.rx.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.rx.borrow().user().cloned()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.rx.borrow().user().map(|u| u.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.rx.borrow(), GateState::Authenticated(_))
    }

    pub fn route(&self) -> Route {
        self.rx.borrow().route()
    }

    /// Waits until the initial lookup has answered and returns the state.
    ///
    /// If the gate has stopped before resolving, returns whatever state it
    /// last held.
    pub async fn wait_resolved(&mut self) -> GateState {
        let resolved = self
            .rx
            .wait_for(GateState::is_resolved)
            .await
            .map(|state| state.clone());
        match resolved {
            Ok(state) => state,
            Err(_) => self.rx.borrow().clone(),
        }
    }

    /// Waits for the next state change. Returns `None` once the gate has
    /// stopped and no further changes can happen.
    pub async fn changed(&mut self) -> Option<GateState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Owns the listener that keeps the session state current.
///
/// Dropping the gate stops the listener; [`unsubscribe`](Self::unsubscribe)
/// does the same and also waits for the provider registration to be
/// released.
pub struct SessionGate {
    view: SessionView,
    cancel: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl SessionGate {
    /// Subscribes to `provider` and starts resolving the initial session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(provider: Arc<dyn AuthProvider>) -> Self {
        let (tx, rx) = watch::channel(GateState::Unknown);
        let cancel = CancellationToken::new();
        let listener = tokio::spawn(listen(provider, tx, cancel.clone()));
        Self {
            view: SessionView { rx },
            cancel,
            listener: Some(listener),
        }
    }

    pub fn view(&self) -> SessionView {
        self.view.clone()
    }

    pub fn state(&self) -> GateState {
        self.view.state()
    }

    pub fn route(&self) -> Route {
        self.view.route()
    }

    /// Stops following the provider. Consumes the gate, so this can only
    /// happen once; existing views keep the last known state.
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(listener) = self.listener.take()
            && let Err(e) = listener.await
        {
            warn!(error = %e, "session listener ended abnormally");
        }
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn resolved(result: Result<Option<Session>, CheckpadError>) -> GateState {
    match result {
        Ok(session) => GateState::from_session(session),
        Err(e) => {
            warn!(error = %e, "session lookup failed, treating as signed out");
            GateState::Unauthenticated
        }
    }
}

fn log_transition(state: &GateState) {
    match state {
        GateState::Authenticated(session) => {
            info!(user_id = %session.user.id, "session gate: authenticated");
        }
        GateState::Unauthenticated => info!("session gate: unauthenticated"),
        GateState::Unknown => {}
    }
}

async fn listen(
    provider: Arc<dyn AuthProvider>,
    tx: watch::Sender<GateState>,
    cancel: CancellationToken,
) {
    // Subscribe before the first lookup so a transition racing with it is
    // not lost.
    let mut subscription = provider.subscribe();
    let mut initial = provider.current_session();
    let mut awaiting_initial = true;
    let mut events_open = true;

    while awaiting_initial || events_open {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("session gate stopping");
                break;
            }
            result = &mut initial, if awaiting_initial => {
                awaiting_initial = false;
                let state = resolved(result);
                // A pushed event already answered the question; it is newer.
                let applied = tx.send_if_modified(|current| {
                    if current.is_resolved() {
                        return false;
                    }
                    *current = state.clone();
                    true
                });
                if applied {
                    log_transition(&state);
                } else {
                    debug!("initial session lookup superseded by an event");
                }
            }
            event = subscription.recv(), if events_open => match event {
                Ok(SessionEvent { kind, session }) => {
                    debug!(event = %kind, "session event received");
                    let state = GateState::from_session(session);
                    log_transition(&state);
                    tx.send_replace(state);
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "session events lagged, re-reading current session");
                    let state = resolved(provider.current_session().await);
                    log_transition(&state);
                    tx.send_replace(state);
                }
                Err(RecvError::Closed) => {
                    debug!("auth provider closed its event channel");
                    events_open = false;
                }
            },
        }
    }

    drop(initial);
    subscription.unsubscribe();
}
