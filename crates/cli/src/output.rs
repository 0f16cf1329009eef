// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use sz_core::ProjectRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// A project's lock record as shown by `serialize status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    pub project: String,
    pub state: String,
    pub waiting: Vec<String>,
    /// False when the table has no row yet; the project then reads as idle
    pub exists: bool,
}

impl ProjectStatus {
    pub fn from_record(project: &str, record: Option<ProjectRecord>) -> Self {
        let exists = record.is_some();
        let record = record.unwrap_or_else(|| ProjectRecord::idle(project));
        Self {
            project: record.project,
            state: record.state.to_string(),
            waiting: record.waiting.into_iter().collect(),
            exists,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "project: {}", self.project)?;
        if self.exists {
            writeln!(f, "state:   {}", self.state)?;
        } else {
            writeln!(f, "state:   {} (no record)", self.state)?;
        }
        if self.waiting.is_empty() {
            write!(f, "waiting: -")
        } else {
            write!(f, "waiting: {}", self.waiting.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
