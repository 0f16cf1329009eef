// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file discovery, parsing and environment overrides
//!
//! Lookup order: explicit path, then `serialize.toml` next to the
//! executable, then built-in defaults. AWS credentials and region from the
//! environment always win over the file.

use super::settings::SerializeConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "serialize.toml";
pub const CONFIG_PATH_ENV: &str = "SERIALIZE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl SerializeConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: SerializeConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Resolve and load the configuration.
    ///
    /// An explicit path must exist. The implicit file next to `exe_dir` is
    /// optional.
    pub fn discover(explicit: Option<&Path>, exe_dir: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading explicit config");
            return Self::from_file(path);
        }

        if let Some(candidate) = exe_dir.map(|dir| dir.join(CONFIG_FILE_NAME)) {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading config next to executable");
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("no config file, using defaults");
        Ok(Self::default())
    }

    /// Apply `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_REGION`.
    ///
    /// Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(id) = get("AWS_ACCESS_KEY_ID") {
            self.aws.access_key_id = Some(id);
        }
        if let Some(secret) = get("AWS_SECRET_ACCESS_KEY") {
            self.aws.secret_access_key = Some(secret);
        }
        if let Some(region) = get("AWS_REGION") {
            self.aws.region = Some(region);
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.table.name.trim().is_empty() {
            return Err(ConfigError::Invalid("table.name must not be empty".to_string()));
        }
        if self.table.read_capacity < 1 || self.table.write_capacity < 1 {
            return Err(ConfigError::Invalid(
                "table capacities must be at least 1".to_string(),
            ));
        }
        if self.runner.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "runner.command must not be empty".to_string(),
            ));
        }
        if self.lock.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "lock.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
