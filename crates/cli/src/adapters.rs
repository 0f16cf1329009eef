// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production adapters for CLI commands

use sz_adapters::{
    CommandRunner, DynamoStore, DynamoStoreConfig, RetryingStore, TracedJobRunner, TracedStore,
};
use sz_core::SerializeConfig;

/// Lock table as used by every command: each attempt traced, throttling retried
pub type CliStore = RetryingStore<TracedStore<DynamoStore>>;

pub type CliRunner = TracedJobRunner<CommandRunner>;

/// Connect to the configured lock table
pub async fn make_store(config: &SerializeConfig) -> CliStore {
    let dynamo = DynamoStore::connect(DynamoStoreConfig::from_config(config)).await;
    RetryingStore::new(TracedStore::new(dynamo), config.backoff.policy())
}

/// Runner for `<command> [args] <playbook>`
pub fn make_runner(config: &SerializeConfig) -> CliRunner {
    let runner =
        CommandRunner::new(config.runner.command.clone()).with_args(config.runner.args.clone());
    TracedJobRunner::new(runner)
}
