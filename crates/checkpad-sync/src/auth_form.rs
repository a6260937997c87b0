// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sign-in / sign-up form state.
//!
//! Auth failures stay local to the form and never touch the dashboard's
//! error slot. A successful sign-in needs no follow-up here: the session
//! gate sees the provider's event and switches the route.

use std::sync::{Arc, Mutex, MutexGuard};

use checkpad_core::{AuthProvider, SignUpOutcome};
use tracing::{info, warn};

/// Shown after a sign-up that still needs the emailed link.
pub const CONFIRMATION_NOTICE: &str = "Check your email for the confirmation link!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// Result of submitting the form.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    SignedIn,
    /// Account created; the user has to confirm their email first.
    ConfirmationSent,
    /// Email or password missing, or a submission is already running.
    Ignored,
    Failed(String),
}

/// Snapshot of the form for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFormView {
    pub mode: AuthMode,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub loading: bool,
}

/// Drives sign-in and sign-up against the auth provider.
pub struct AuthForm {
    auth: Arc<dyn AuthProvider>,
    state: Mutex<AuthFormView>,
}

impl AuthForm {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            state: Mutex::new(AuthFormView::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, AuthFormView> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn view(&self) -> AuthFormView {
        self.state().clone()
    }

    /// Switches between sign-in and sign-up, clearing messages.
    pub fn set_mode(&self, mode: AuthMode) {
        let mut state = self.state();
        state.mode = mode;
        state.error = None;
        state.notice = None;
    }

    pub async fn submit(&self, email: &str, password: &str) -> FormOutcome {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return FormOutcome::Ignored;
        }

        let mode = {
            let mut state = self.state();
            if state.loading {
                return FormOutcome::Ignored;
            }
            state.loading = true;
            state.error = None;
            state.notice = None;
            state.mode
        };

        let outcome = match mode {
            AuthMode::SignIn => match self.auth.sign_in_with_password(email, password).await {
                Ok(session) => {
                    info!(user_id = %session.user.id, "signed in");
                    FormOutcome::SignedIn
                }
                Err(e) => FormOutcome::Failed(e.user_message()),
            },
            AuthMode::SignUp => match self.auth.sign_up(email, password).await {
                Ok(SignUpOutcome::SignedIn(session)) => {
                    info!(user_id = %session.user.id, "signed up and signed in");
                    FormOutcome::SignedIn
                }
                Ok(SignUpOutcome::ConfirmationRequired) => FormOutcome::ConfirmationSent,
                Err(e) => FormOutcome::Failed(e.user_message()),
            },
        };

        let mut state = self.state();
        state.loading = false;
        match &outcome {
            FormOutcome::Failed(message) => {
                warn!(mode = ?mode, error = %message, "authentication failed");
                state.error = Some(message.clone());
            }
            FormOutcome::ConfirmationSent => {
                state.notice = Some(CONFIRMATION_NOTICE.to_string());
            }
            FormOutcome::SignedIn | FormOutcome::Ignored => {}
        }
        outcome
    }
}
