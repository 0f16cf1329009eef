// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job process adapters

mod command;

pub use command::{ChildHandle, CommandRunner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJobHandle, FakeJobRunner, JobScript, ProcessCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from process operations
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for job: {0}")]
    Wait(#[source] std::io::Error),
    #[error("failed to signal job: {0}")]
    Signal(String),
}

/// How a job process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobExit {
    /// Exited on its own with this status
    Code(i32),
    /// Terminated by this signal number
    Signaled(i32),
}

impl JobExit {
    /// Exit code to propagate: the status, or `256 - signal`.
    ///
    /// Signals land in 192..=255 and never on 130, which is kept for an
    /// interrupted orchestrator.
    pub fn code(self) -> i32 {
        match self {
            JobExit::Code(code) => code,
            JobExit::Signaled(signal) => 256 - signal.clamp(1, 255),
        }
    }
}

impl From<std::process::ExitStatus> for JobExit {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return JobExit::Signaled(signal);
            }
        }
        JobExit::Code(status.code().unwrap_or(1))
    }
}

/// Launches job processes
#[async_trait]
pub trait JobRunner: Clone + Send + Sync + 'static {
    type Handle: JobHandle;

    /// Start the job. The job name is the last argument of the command.
    async fn start(&self, job: &str) -> Result<Self::Handle, ProcessError>;
}

/// A running job process
#[async_trait]
pub trait JobHandle: Send + 'static {
    fn pid(&self) -> Option<u32>;

    /// Wait for the process to exit
    async fn wait(&mut self) -> Result<JobExit, ProcessError>;

    /// Non-blocking exit check
    fn try_wait(&mut self) -> Result<Option<JobExit>, ProcessError>;

    /// Ask the process to stop (SIGTERM)
    fn terminate(&mut self) -> Result<(), ProcessError>;

    /// Force the process to stop (SIGKILL)
    fn kill(&mut self) -> Result<(), ProcessError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
