// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration sections
//!
//! Every field has a default so an empty file (or no file) is a valid
//! configuration.

use crate::backoff::Backoff;
use crate::reap::ReapPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TABLE: &str = "serialize-ansible";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Full configuration bundle handed to the engine
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SerializeConfig {
    pub aws: AwsConfig,
    pub table: TableConfig,
    pub lock: LockConfig,
    pub backoff: BackoffConfig,
    pub runner: RunnerConfig,
    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Credentials and endpoint for the store
#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Override the service endpoint (local DynamoDB)
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Static credentials, when both halves are configured
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

// Keep the secret out of logs
impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Backing table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    /// Provisioned read capacity used when the table is created
    pub read_capacity: i64,
    /// Provisioned write capacity used when the table is created
    pub write_capacity: i64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE.to_string(),
            read_capacity: 1,
            write_capacity: 1,
        }
    }
}

/// Activation polling
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LockConfig {
    /// Sleep between activation attempts while the project is active
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Give up waiting after this long (unbounded when unset)
    #[serde(default, with = "humantime_serde::option")]
    pub max_wait: Option<Duration>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_wait: None,
        }
    }
}

/// Retry policy for throttled store calls
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffConfig {
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Total attempts per call (unbounded when unset)
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

impl BackoffConfig {
    pub fn policy(&self) -> Backoff {
        let policy = Backoff::constant(self.delay);
        match self.max_attempts {
            Some(max) => policy.with_max_attempts(max),
            None => policy,
        }
    }
}

/// External job command
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Program to run; the job name is appended as the last argument
    pub command: String,
    pub args: Vec<String>,
    pub terminate_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub terminate_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let reap = ReapPolicy::default();
        Self {
            command: "ansible-playbook".to_string(),
            args: Vec::new(),
            terminate_attempts: reap.terminate_attempts,
            terminate_interval: reap.terminate_interval,
        }
    }
}

impl RunnerConfig {
    pub fn reap_policy(&self) -> ReapPolicy {
        ReapPolicy {
            terminate_attempts: self.terminate_attempts,
            terminate_interval: self.terminate_interval,
        }
    }
}
