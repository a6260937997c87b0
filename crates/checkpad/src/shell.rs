// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `checkpad shell` command implementation.
//!
//! An interactive dashboard: the session gate decides whether the prompt
//! offers sign-in or the checklist commands, and the synchronizer keeps the
//! rendered lists in step with the backend.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use checkpad_config::CheckpadConfig;
use checkpad_core::{AuthProvider, CheckpadError, ChecklistId, DataStore, UserId};
use checkpad_supabase::Backend;
use checkpad_sync::{
    AuthForm, AuthMode, CONFIRMATION_NOTICE, ChecklistSynchronizer, FormOutcome, Guard, Outcome,
    SessionGate, SessionView, SyncOptions,
};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::commands::{prompt_line, prompt_password, submit_form};
use crate::render;

/// How long to wait for the gate to see our own sign-in or sign-out.
const GATE_SETTLE: Duration = Duration::from_secs(5);

/// Which checklist a `select` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in the rendered list.
    Index(usize),
    /// Server id, written `#42`.
    Id(i64),
    None,
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Lists,
    New(String),
    Select(Target),
    Add(String),
    /// 1-based position in the selected checklist.
    Toggle(usize),
    Refresh,
    Dismiss,
    Login,
    Signup,
    Logout,
    Help,
    Quit,
    Empty,
    /// Known command, wrong arguments.
    Usage(&'static str),
    Unknown(String),
}

fn position(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_target(arg: &str) -> Option<Target> {
    if arg == "none" {
        return Some(Target::None);
    }
    match arg.strip_prefix('#') {
        Some(id) => id.parse().ok().map(Target::Id),
        None => position(arg).map(Target::Index),
    }
}

/// Parses one line of input.
pub fn parse(line: &str) -> ShellCommand {
    let line = line.trim();
    let (cmd, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match cmd {
        "" => ShellCommand::Empty,
        "/quit" | "/exit" | "quit" | "exit" => ShellCommand::Quit,
        "lists" | "ls" => ShellCommand::Lists,
        "new" => ShellCommand::New(rest.to_string()),
        "add" => ShellCommand::Add(rest.to_string()),
        "select" | "open" => parse_target(rest)
            .map(ShellCommand::Select)
            .unwrap_or(ShellCommand::Usage("select <n>|#<id>|none")),
        "toggle" | "done" => match position(rest) {
            Some(n) => ShellCommand::Toggle(n),
            None => ShellCommand::Usage("toggle <n>"),
        },
        "refresh" => ShellCommand::Refresh,
        "dismiss" => ShellCommand::Dismiss,
        "login" => ShellCommand::Login,
        "signup" => ShellCommand::Signup,
        "logout" => ShellCommand::Logout,
        "help" | "?" => ShellCommand::Help,
        other => ShellCommand::Unknown(other.to_string()),
    }
}

const HELP: &str = "\
signed out:
  login                 sign in with email and password
  signup                create an account
signed in:
  lists                 show your checklists
  new <title>           create a checklist
  select <n>|#<id>|none choose the checklist to work on
  add <title>           add a task to the selected checklist
  toggle <n>            flip task n of the selected checklist
  refresh               reload from the backend
  dismiss               clear the error message
  logout                sign out
  /quit                 leave the shell";

fn guard_message(guard: Guard) -> &'static str {
    match guard {
        Guard::EmptyTitle => "a title is required",
        Guard::NoUser => "not signed in",
        Guard::NoSelection => "select a checklist first",
    }
}

/// Waits (bounded) until the gate reports `signed_in`.
async fn await_gate(view: &mut SessionView, signed_in: bool) {
    let settled = tokio::time::timeout(GATE_SETTLE, async {
        while view.is_authenticated() != signed_in {
            if view.changed().await.is_none() {
                break;
            }
        }
    })
    .await;
    if settled.is_err() {
        debug!(signed_in, "gate did not settle in time");
    }
}

struct Shell {
    sync: ChecklistSynchronizer,
    form: AuthForm,
    view: SessionView,
    editor: DefaultEditor,
    color: bool,
}

impl Shell {
    fn show(&self) {
        print!("{}", render::render_dashboard(&self.sync.snapshot(), self.color));
    }

    fn report(&self, outcome: Outcome) {
        match outcome {
            Outcome::Applied | Outcome::Failed(_) => self.show(),
            Outcome::Ignored(guard) => println!("{}", guard_message(guard)),
            Outcome::Superseded => {}
        }
    }

    async fn authenticate(&mut self, mode: AuthMode) -> Result<(), CheckpadError> {
        self.form.set_mode(mode);
        let email = prompt_line(&mut self.editor, "email: ")?;
        let password = prompt_password()?;
        match submit_form(&self.form, &email, &password).await? {
            FormOutcome::ConfirmationSent => println!("{CONFIRMATION_NOTICE}"),
            _ => await_gate(&mut self.view, true).await,
        }
        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<(), CheckpadError> {
        let signed_in = self.view.is_authenticated();
        match command {
            ShellCommand::Empty | ShellCommand::Quit => {}
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Usage(usage) => println!("usage: {usage}"),
            ShellCommand::Unknown(cmd) => {
                println!("unknown command `{cmd}`; type {} for a list", "help".cyan())
            }
            ShellCommand::Login | ShellCommand::Signup if signed_in => {
                println!("already signed in; `logout` first")
            }
            ShellCommand::Login => self.authenticate(AuthMode::SignIn).await?,
            ShellCommand::Signup => self.authenticate(AuthMode::SignUp).await?,
            _ if !signed_in => println!("not signed in; use `login` or `signup`"),
            ShellCommand::Lists => self.show(),
            ShellCommand::Refresh => {
                let outcome = self.sync.load_all().await;
                self.report(outcome);
            }
            ShellCommand::Dismiss => {
                self.sync.dismiss_error();
                self.show();
            }
            ShellCommand::New(title) => {
                self.sync.set_checklist_draft(title);
                let outcome = self.sync.submit_checklist_draft().await;
                self.report(outcome);
            }
            ShellCommand::Add(title) => {
                self.sync.set_task_draft(title);
                let outcome = self.sync.submit_task_draft().await;
                self.report(outcome);
            }
            ShellCommand::Select(target) => self.select(target),
            ShellCommand::Toggle(n) => {
                let task = self
                    .sync
                    .snapshot()
                    .selected
                    .and_then(|c| c.tasks.get(n - 1).cloned());
                match task {
                    Some(task) => {
                        let outcome = self.sync.toggle_task(&task).await;
                        self.report(outcome);
                    }
                    None if self.sync.snapshot().selected.is_none() => {
                        println!("{}", guard_message(Guard::NoSelection))
                    }
                    None => println!("no task {n} in this checklist"),
                }
            }
            ShellCommand::Logout => match self.sync.sign_out().await {
                Outcome::Failed(message) => return Err(CheckpadError::auth(message)),
                _ => await_gate(&mut self.view, false).await,
            },
        }
        Ok(())
    }

    fn select(&self, target: Target) {
        let id = match target {
            Target::None => {
                self.sync.select_none();
                self.show();
                return;
            }
            Target::Id(id) => Some(ChecklistId(id)),
            Target::Index(n) => self.sync.snapshot().checklists.get(n - 1).map(|c| c.id),
        };
        match id {
            Some(id) if self.sync.select(id) => self.show(),
            _ => println!("no such checklist"),
        }
    }
}

/// Run the `checkpad shell` command.
pub async fn run_shell(config: &CheckpadConfig) -> Result<(), CheckpadError> {
    let backend = Backend::from_config(config)?;
    let auth: Arc<dyn AuthProvider> = backend.auth.clone();
    let store: Arc<dyn DataStore> = backend.store.clone();

    let gate = SessionGate::start(auth.clone());
    let mut view = gate.view();
    println!("{}", "Loading...".dimmed());
    view.wait_resolved().await;

    let editor = DefaultEditor::new()
        .map_err(|e| CheckpadError::Internal(format!("failed to initialize readline: {e}")))?;

    let mut shell = Shell {
        sync: ChecklistSynchronizer::new(
            store,
            auth.clone(),
            gate.view(),
            SyncOptions::from_config(&config.sync),
        ),
        form: AuthForm::new(auth),
        view,
        editor,
        color: std::io::stdout().is_terminal(),
    };

    println!("{}", "checkpad shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "/quit".yellow());

    let mut shown: Option<UserId> = None;
    loop {
        // A different user (or none) means a fresh mirror.
        let current = shell.view.user_id();
        if current != shown {
            shell.sync.reset();
            match &current {
                Some(user) => {
                    debug!(user_id = %user, "loading dashboard");
                    let outcome = shell.sync.load_all().await;
                    shell.report(outcome);
                }
                None => println!("Signed out. Use {} or {}.", "login".cyan(), "signup".cyan()),
            }
            shown = current;
        }

        let prompt = if shown.is_some() {
            format!("{}> ", "checkpad".green())
        } else {
            format!("{}> ", "checkpad (signed out)".yellow())
        };

        match shell.editor.readline(&prompt) {
            Ok(line) => {
                let command = parse(&line);
                if command == ShellCommand::Quit {
                    break;
                }
                if command != ShellCommand::Empty {
                    let _ = shell.editor.add_history_entry(&line);
                }
                if let Err(e) = shell.execute(command).await {
                    eprintln!("{}: {}", "error".red(), e.user_message());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    gate.unsubscribe().await;
    println!("{}", "goodbye".dimmed());
    Ok(())
}
