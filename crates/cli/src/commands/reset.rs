// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clear stale waiting entries
//!
//! A run killed with SIGKILL never unregisters, and its playbook then reads
//! as already waiting forever.

use crate::adapters::make_store;
use crate::error::CliError;
use anyhow::Result;
use clap::Args;
use sz_core::SerializeConfig;
use sz_engine::ProjectLock;

#[derive(Args, Debug, Clone)]
pub struct ResetArgs {
    /// Project whose waiting set is reset
    #[arg(long, env = "ANSIBLE_PROJECT")]
    pub project: String,

    /// Remove only this playbook (default: the whole set)
    #[arg(long)]
    pub playbook: Option<String>,
}

pub async fn reset_waiting(args: ResetArgs, config: &SerializeConfig) -> Result<i32> {
    let lock = ProjectLock::new(make_store(config).await);
    let project = args.project.as_str();

    match &args.playbook {
        Some(playbook) => {
            lock.unregister_waiting(project, playbook)
                .await
                .map_err(|e| CliError::store(project, e))?;
            println!(
                "Removed playbook \"{}\" from the waiting set of project \"{}\"",
                playbook, project
            );
        }
        None => {
            lock.reset_waiting(project)
                .await
                .map_err(|e| CliError::store(project, e))?;
            println!("Cleared the waiting set of project \"{}\"", project);
        }
    }
    Ok(0)
}
