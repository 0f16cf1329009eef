// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Variables the binary reads; cleared so the host environment cannot leak in
const INHERITED_ENV: &[&str] = &[
    "ANSIBLE_PROJECT",
    "ANSIBLE_PLAYBOOK",
    "SERIALIZE_CONFIG",
    "SERIALIZE_LOG",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_REGION",
    "AWS_PROFILE",
];

/// A scratch directory holding a config file for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `serialize.toml` into the scratch directory
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("serialize.toml");
        fs::write(&path, content).expect("Failed to write config");
        path
    }

    /// The binary, run from the scratch directory with a clean environment
    pub fn serialize(&self) -> Command {
        let mut cmd = Command::cargo_bin("serialize").expect("Failed to find serialize binary");
        for var in INHERITED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("HOME", self.dir.path())
            .env("AWS_EC2_METADATA_DISABLED", "true")
            .current_dir(self.dir.path());
        cmd
    }
}

/// Config pointing at a port nothing listens on, with retries bounded
pub fn unreachable_store_config() -> &'static str {
    r#"
[aws]
region = "us-east-1"
access_key_id = "AKIDTEST"
secret_access_key = "test-secret"
endpoint_url = "http://127.0.0.1:9"

[backoff]
delay = "10ms"
max_attempts = 1
"#
}
