// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkpad - checklists with progress, synced to your backend.
//!
//! This is the binary entry point for the terminal client.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod render;
mod shell;

use std::path::PathBuf;

use checkpad_config::CheckpadConfig;
use clap::{Parser, Subcommand};
use colored::Colorize;

/// Checkpad - checklists with progress, synced to your backend.
#[derive(Parser, Debug)]
#[command(name = "checkpad", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account.
    Signup {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Print your checklists and their progress.
    Lists {
        /// Disable colours.
        #[arg(long)]
        plain: bool,
    },
    /// Show backend reachability and session state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colours.
        #[arg(long)]
        plain: bool,
    },
    /// Launch the interactive dashboard (default).
    Shell,
}

fn load_config(path: Option<&PathBuf>) -> CheckpadConfig {
    let loaded = match path {
        Some(path) => checkpad_config::load_and_validate_path(path),
        None => checkpad_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            checkpad_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// rendered output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("checkpad={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.log.level);

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Login { email } => commands::run_login(&config, email).await,
        Commands::Signup { email } => commands::run_signup(&config, email).await,
        Commands::Logout => commands::run_logout(&config).await,
        Commands::Lists { plain } => commands::run_lists(&config, plain).await,
        Commands::Status { json, plain } => commands::run_status(&config, json, plain).await,
        Commands::Shell => shell::run_shell(&config).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}
