// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration model and loading

mod loader;
mod settings;

pub use loader::{ConfigError, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use settings::{
    AwsConfig, BackoffConfig, LockConfig, RunnerConfig, SerializeConfig, TableConfig,
    DEFAULT_REGION, DEFAULT_TABLE,
};
