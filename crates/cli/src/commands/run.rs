// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run a playbook under the project lock

use crate::adapters::{make_runner, make_store};
use crate::error::CliError;
use anyhow::Result;
use clap::Args;
use sz_adapters::TerminalReporter;
use sz_core::SerializeConfig;
use sz_engine::{interrupt_channel, InterruptTrigger, Serializer, SerializerConfig, SerializerDeps};
use tokio::signal::unix::{signal, SignalKind};

pub const PROJECT_ENV: &str = "ANSIBLE_PROJECT";
pub const PLAYBOOK_ENV: &str = "ANSIBLE_PLAYBOOK";

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Project to lock
    #[arg(long, env = "ANSIBLE_PROJECT")]
    pub project: Option<String>,

    /// Playbook to run once the project is idle
    #[arg(long, env = "ANSIBLE_PLAYBOOK")]
    pub playbook: Option<String>,
}

impl RunArgs {
    /// Project and playbook, both required and non-blank
    pub fn resolve(self) -> Result<(String, String), CliError> {
        let project = non_blank(self.project)
            .ok_or_else(|| CliError::missing_input("project", PROJECT_ENV))?;
        let playbook = non_blank(self.playbook)
            .ok_or_else(|| CliError::missing_input("playbook", PLAYBOOK_ENV))?;
        Ok((project, playbook))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn run(args: RunArgs, config: &SerializeConfig) -> Result<i32> {
    let (project, playbook) = args.resolve()?;

    let deps = SerializerDeps {
        store: make_store(config).await,
        runner: make_runner(config),
        reporter: TerminalReporter::stdio(),
    };
    let serializer = Serializer::new(deps, SerializerConfig::from(config));

    let (trigger, interrupt) = interrupt_channel();
    let signals = tokio::spawn(forward_signals(trigger));

    let result = serializer.serialize(&project, &playbook, &interrupt).await;
    signals.abort();

    let outcome = result.map_err(|e| CliError::serialize(&project, &config.runner.command, e))?;
    tracing::debug!(?outcome, "serialize finished");
    Ok(outcome.exit_code())
}

/// Fire the interrupt on the first SIGINT or SIGTERM.
///
/// The handlers stay installed afterwards, so later signals cannot cut the
/// cleanup short.
async fn forward_signals(trigger: InterruptTrigger) {
    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "failed to install signal handlers");
                return;
            }
        };

    tokio::select! {
        _ = sigint.recv() => tracing::info!("received SIGINT"),
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
    }
    trigger.trigger();
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
