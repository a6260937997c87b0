// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sign-in form state against the mock auth provider.

use std::sync::Arc;

use checkpad_core::AuthProvider;
use checkpad_sync::{AuthForm, AuthMode, CONFIRMATION_NOTICE, FormOutcome};
use checkpad_test_utils::MockAuthProvider;

fn form(auth: &Arc<MockAuthProvider>) -> AuthForm {
    AuthForm::new(auth.clone() as Arc<dyn AuthProvider>)
}

#[tokio::test]
async fn sign_in_success_leaves_no_message() {
    let auth = Arc::new(MockAuthProvider::new());
    auth.register("ada@example.com", "secret");
    let form = form(&auth);

    assert_eq!(
        form.submit("ada@example.com", "secret").await,
        FormOutcome::SignedIn
    );
    let view = form.view();
    assert!(!view.loading);
    assert!(view.error.is_none());
    assert!(auth.current_session().await.unwrap().is_some());
}

#[tokio::test]
async fn bad_credentials_show_form_error_and_can_retry() {
    let auth = Arc::new(MockAuthProvider::new());
    auth.register("ada@example.com", "secret");
    let form = form(&auth);

    let outcome = form.submit("ada@example.com", "wrong").await;
    assert_eq!(outcome, FormOutcome::Failed("Invalid login credentials".into()));
    assert_eq!(
        form.view().error.as_deref(),
        Some("Invalid login credentials")
    );

    assert_eq!(
        form.submit("ada@example.com", "secret").await,
        FormOutcome::SignedIn
    );
    assert!(form.view().error.is_none());
}

#[tokio::test]
async fn sign_up_needing_confirmation_shows_notice() {
    let auth = Arc::new(MockAuthProvider::new());
    auth.require_confirmation();
    let form = form(&auth);
    form.set_mode(AuthMode::SignUp);

    assert_eq!(
        form.submit("new@example.com", "pw").await,
        FormOutcome::ConfirmationSent
    );
    assert_eq!(form.view().notice.as_deref(), Some(CONFIRMATION_NOTICE));
    assert!(auth.current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn sign_up_can_sign_in_immediately() {
    let auth = Arc::new(MockAuthProvider::new());
    let form = form(&auth);
    form.set_mode(AuthMode::SignUp);

    assert_eq!(
        form.submit("new@example.com", "pw").await,
        FormOutcome::SignedIn
    );
    assert!(form.view().notice.is_none());
}

#[tokio::test]
async fn missing_fields_are_ignored() {
    let auth = Arc::new(MockAuthProvider::new());
    let form = form(&auth);

    assert_eq!(form.submit("  ", "pw").await, FormOutcome::Ignored);
    assert_eq!(form.submit("a@b.c", "").await, FormOutcome::Ignored);
    assert!(form.view().error.is_none());
}

#[tokio::test]
async fn switching_mode_clears_messages() {
    let auth = Arc::new(MockAuthProvider::new());
    let form = form(&auth);
    let _ = form.submit("ghost@example.com", "pw").await;
    assert!(form.view().error.is_some());

    form.set_mode(AuthMode::SignUp);
    let view = form.view();
    assert_eq!(view.mode, AuthMode::SignUp);
    assert!(view.error.is_none());
}
