// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error carries:
//! - What went wrong (message)
//! - Why it might have happened (context)
//! - How to fix it (suggestions)
//! - The process exit code it maps to

use std::fmt;
use sz_adapters::{ProcessError, StoreError};
use sz_core::config::CONFIG_PATH_ENV;
use sz_core::ConfigError;
use sz_engine::{SerializeError, EXIT_INTERRUPTED};

/// Exit code for bad invocations
pub const EXIT_USAGE: i32 = 2;
/// Exit code for store and setup failures (EX_SOFTWARE)
pub const EXIT_FATAL: i32 = 70;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    pub exit_code: i32,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// A fatal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            exit_code: EXIT_FATAL,
            source: None,
        }
    }

    /// An invocation error with the given message.
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            exit_code: EXIT_USAGE,
            ..Self::new(message)
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl CliError {
    /// A required value was given neither as a flag nor in the environment.
    pub fn missing_input(flag: &str, env: &str) -> Self {
        CliError::usage(format!("missing --{}", flag))
            .with_suggestion(format!(
                "Pass --{} <NAME> or set {} in the environment",
                flag, env
            ))
    }

    /// The configuration file could not be loaded.
    pub fn config(err: ConfigError) -> Self {
        let suggestion = match &err {
            ConfigError::Read { .. } => {
                format!("Check the path given with --config or {}", CONFIG_PATH_ENV)
            }
            ConfigError::Parse { .. } | ConfigError::Invalid(_) => {
                "Fix the file; sections are [aws] [table] [lock] [backoff] [runner] and log_file"
                    .to_string()
            }
        };
        CliError::new(err.to_string())
            .with_suggestion(suggestion)
            .with_source(err)
    }

    /// A lock-table call failed outside a serialize run.
    pub fn store(project: &str, err: StoreError) -> Self {
        let base = CliError::new(format!("Lock table request failed for project \"{}\"", project))
            .with_context(err.to_string());
        let with_hints = match &err {
            StoreError::Throttled(_) => base
                .with_context("Retries ran out before the table accepted the request")
                .with_suggestion("Raise [backoff] max_attempts or the table's write capacity"),
            StoreError::TableStatus(status) => base
                .with_context(format!("The table is {} instead of ACTIVE", status))
                .with_suggestion("Wait for the table to settle, then retry"),
            StoreError::Malformed { .. } => base.with_suggestion(
                "Repair the row so state is idle, active or blocked and waiting is a string set",
            ),
            StoreError::Interrupted => CliError {
                exit_code: EXIT_INTERRUPTED,
                ..base
            },
            StoreError::ConditionFailed | StoreError::Backend(_) => base
                .with_suggestion("Check AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AWS_REGION")
                .with_suggestion("Check [aws] endpoint_url when using a local table"),
        };
        with_hints.with_source(err)
    }

    /// A serialize run failed after setup.
    pub fn serialize(project: &str, program: &str, err: SerializeError) -> Self {
        match err {
            SerializeError::Store(source) => CliError::store(project, source),
            SerializeError::Process(source) => {
                let base = CliError::new(format!(
                    "Playbook for project \"{}\" could not be run",
                    project
                ))
                .with_context(source.to_string());
                let base = match &source {
                    ProcessError::Launch { .. } => base.with_suggestion(format!(
                        "Check that {} is installed and on PATH, or set [runner] command",
                        program
                    )),
                    ProcessError::Wait(_) | ProcessError::Signal(_) => base,
                };
                base.with_source(source)
            }
            SerializeError::Release { project, source } => CliError::new(format!(
                "Project \"{}\" could not be returned to idle",
                project
            ))
            .with_context(source.to_string())
            .with_context("The project may still read as active and block other runs")
            .with_suggestion(format!(
                "Inspect it with: serialize status --project {}",
                project
            ))
            .with_suggestion("Once no playbook is running, set its state to idle in the table")
            .with_source(source),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
