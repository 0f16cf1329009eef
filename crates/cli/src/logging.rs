// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic logging setup
//!
//! Logs go to stderr, or to `log_file` when configured. Progress messages
//! for the operator are printed by the reporter and never pass through here.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use sz_core::SerializeConfig;
use tracing_appender::non_blocking::WorkerGuard;

/// Filter directives, e.g. `SERIALIZE_LOG=sz_engine=debug`
pub const LOG_ENV: &str = "SERIALIZE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(config: &SerializeConfig) -> Result<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, guard, ansi) = match &config.log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (writer, guard, false)
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            (writer, guard, true)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(ansi))
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))?;

    Ok(guard)
}

/// Directory and file name of a log path; a bare name lands in the
/// current directory
fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log_file {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, file_name))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
