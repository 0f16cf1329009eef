// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! serialize - run ansible playbooks one at a time per project

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod adapters;
mod commands;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{reset, run, status};
use error::{CliError, EXIT_FATAL};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sz_core::config::CONFIG_PATH_ENV;
use sz_core::SerializeConfig;

#[derive(Parser)]
#[command(
    name = "serialize",
    version,
    about = "Run ansible playbooks one at a time per project",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Configuration file (default: serialize.toml next to the binary)
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: run::RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the project to be idle, then run the playbook (default)
    Run(run::RunArgs),
    /// Show a project's lock record
    Status(status::StatusArgs),
    /// Remove stale entries from a project's waiting set
    ResetWaiting(reset::ResetArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(cli_err) => {
                eprint!("{}", cli_err);
                cli_err.exit_code
            }
            None => {
                eprintln!("error: {:#}", e);
                EXIT_FATAL
            }
        },
    };
    ExitCode::from(exit_byte(code))
}

/// Exit statuses outside 0..=255 collapse to a generic failure
fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

async fn dispatch(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    let _log_guard = logging::setup_logging(&config)?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        None => run::run(cli.run, &config).await,
        Some(Commands::Run(args)) => run::run(args, &config).await,
        Some(Commands::Status(args)) => status::status(args, &config).await,
        Some(Commands::ResetWaiting(args)) => reset::reset_waiting(args, &config).await,
    }
}

/// Explicit path, else `serialize.toml` beside the executable, else defaults.
/// AWS environment variables are applied on top.
fn load_config(explicit: Option<&Path>) -> Result<SerializeConfig> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let config =
        SerializeConfig::discover(explicit, exe_dir.as_deref()).map_err(CliError::config)?;
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}
