// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `login`, `signup`, `logout`, `lists` and `status`.

use std::io::IsTerminal;
use std::sync::Arc;

use checkpad_config::CheckpadConfig;
use checkpad_core::{Adapter, AuthProvider, CheckpadError, DataStore, HealthStatus};
use checkpad_supabase::Backend;
use checkpad_sync::{
    AuthForm, AuthMode, CONFIRMATION_NOTICE, ChecklistSynchronizer, FormOutcome, Outcome,
    SessionGate, SyncOptions,
};
use colored::Colorize;
use rustyline::DefaultEditor;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::render;

/// Reads one line with the given prompt.
pub fn prompt_line(editor: &mut DefaultEditor, prompt: &str) -> Result<String, CheckpadError> {
    editor
        .readline(prompt)
        .map(|line| line.trim().to_string())
        .map_err(|e| CheckpadError::Internal(format!("failed to read input: {e}")))
}

/// Reads a password without echo.
pub fn prompt_password() -> Result<SecretString, CheckpadError> {
    rpassword::prompt_password("password: ")
        .map(SecretString::from)
        .map_err(|e| CheckpadError::Internal(format!("failed to read password: {e}")))
}

/// Submits the form and turns its outcome into a printable result.
pub async fn submit_form(
    form: &AuthForm,
    email: &str,
    password: &SecretString,
) -> Result<FormOutcome, CheckpadError> {
    match form.submit(email, password.expose_secret()).await {
        FormOutcome::Ignored => Err(CheckpadError::auth("email and password are required")),
        FormOutcome::Failed(message) => Err(CheckpadError::auth(message)),
        outcome => Ok(outcome),
    }
}

async fn authenticate(
    config: &CheckpadConfig,
    email: Option<String>,
    mode: AuthMode,
) -> Result<(), CheckpadError> {
    let backend = Backend::from_config(config)?;
    let form = AuthForm::new(backend.auth.clone());
    form.set_mode(mode);

    let email = match email {
        Some(email) => email,
        None => {
            let mut editor = DefaultEditor::new()
                .map_err(|e| CheckpadError::Internal(format!("failed to open terminal: {e}")))?;
            prompt_line(&mut editor, "email: ")?
        }
    };
    let password = prompt_password()?;

    match submit_form(&form, &email, &password).await? {
        FormOutcome::ConfirmationSent => println!("{CONFIRMATION_NOTICE}"),
        _ => println!("signed in as {email}"),
    }
    Ok(())
}

/// Run `checkpad login`.
pub async fn run_login(config: &CheckpadConfig, email: Option<String>) -> Result<(), CheckpadError> {
    authenticate(config, email, AuthMode::SignIn).await
}

/// Run `checkpad signup`.
pub async fn run_signup(config: &CheckpadConfig, email: Option<String>) -> Result<(), CheckpadError> {
    authenticate(config, email, AuthMode::SignUp).await
}

/// Run `checkpad logout`.
pub async fn run_logout(config: &CheckpadConfig) -> Result<(), CheckpadError> {
    let backend = Backend::from_config(config)?;
    backend.auth.sign_out().await?;
    println!("signed out");
    Ok(())
}

/// Run `checkpad lists`: load once, print the dashboard, exit.
pub async fn run_lists(config: &CheckpadConfig, plain: bool) -> Result<(), CheckpadError> {
    let backend = Backend::from_config(config)?;
    let auth: Arc<dyn AuthProvider> = backend.auth.clone();
    let store: Arc<dyn DataStore> = backend.store.clone();

    let gate = SessionGate::start(auth.clone());
    let mut view = gate.view();
    if view.wait_resolved().await.user().is_none() {
        gate.unsubscribe().await;
        return Err(CheckpadError::auth("not signed in; run `checkpad login`"));
    }

    let sync = ChecklistSynchronizer::new(
        store,
        auth,
        gate.view(),
        SyncOptions::from_config(&config.sync),
    );
    let outcome = sync.load_all().await;
    gate.unsubscribe().await;

    if let Outcome::Failed(message) = outcome {
        return Err(CheckpadError::store(message));
    }
    let color = !plain && std::io::stdout().is_terminal();
    print!("{}", render::render_dashboard(&sync.snapshot(), color));
    Ok(())
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub backend_url: String,
    pub auth: String,
    pub store: String,
    pub signed_in: bool,
    pub user: Option<String>,
}

fn health_label(result: Result<HealthStatus, CheckpadError>) -> String {
    match result {
        Ok(HealthStatus::Healthy) => "healthy".to_string(),
        Ok(HealthStatus::Degraded(reason)) => format!("degraded: {reason}"),
        Ok(HealthStatus::Unhealthy(reason)) => format!("unhealthy: {reason}"),
        Err(e) => format!("error: {e}"),
    }
}

/// Human-readable status block.
pub fn format_status(status: &StatusResponse, color: bool) -> String {
    let paint = |label: &str| {
        if !color {
            label.to_string()
        } else if label == "healthy" {
            label.green().to_string()
        } else {
            label.red().to_string()
        }
    };
    let who = match &status.user {
        Some(user) => format!("signed in as {user}"),
        None => "signed out".to_string(),
    };
    format!(
        "backend: {}\n  auth:  {}\n  store: {}\nsession: {who}\n",
        status.backend_url,
        paint(&status.auth),
        paint(&status.store),
    )
}

/// Run `checkpad status`.
///
/// Checks both adapters and whether a session is stored. Never fails on an
/// unreachable backend; that is what it reports.
pub async fn run_status(
    config: &CheckpadConfig,
    json: bool,
    plain: bool,
) -> Result<(), CheckpadError> {
    let backend = Backend::from_config(config)?;

    let auth = health_label(backend.auth.health_check().await);
    let store = health_label(backend.store.health_check().await);
    let session = backend.auth.current_session().await.ok().flatten();

    let status = StatusResponse {
        backend_url: config.backend.url.clone(),
        auth,
        store,
        signed_in: session.is_some(),
        user: session.map(|s| {
            s.user
                .email
                .clone()
                .unwrap_or_else(|| s.user.id.to_string())
        }),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let color = !plain && std::io::stdout().is_terminal();
        print!("{}", format_status(&status, color));
    }
    Ok(())
}
