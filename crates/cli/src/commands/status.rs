// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Show a project's lock record

use crate::adapters::make_store;
use crate::error::CliError;
use crate::output::{print, OutputFormat, ProjectStatus};
use anyhow::Result;
use clap::Args;
use sz_adapters::StoreAdapter;
use sz_core::SerializeConfig;

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Project to inspect
    #[arg(long, env = "ANSIBLE_PROJECT")]
    pub project: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Read-only: never creates the table or the row
pub async fn status(args: StatusArgs, config: &SerializeConfig) -> Result<i32> {
    let store = make_store(config).await;
    let record = store
        .get(&args.project)
        .await
        .map_err(|e| CliError::store(&args.project, e))?;

    print(&ProjectStatus::from_record(&args.project, record), args.output);
    Ok(0)
}
