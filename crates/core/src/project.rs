// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project lock record and the pure activation decision
//!
//! One record exists per project in the shared store. The record carries the
//! lock state and an advisory set of job names currently waiting for it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lock state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    /// No job running, safe to activate
    #[default]
    Idle,
    /// Some process currently holds the lock
    Active,
    /// Administratively disabled; never activated by this tool
    Blocked,
}

impl ProjectState {
    /// Wire representation stored in the `state` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectState::Idle => "idle",
            ProjectState::Active => "active",
            ProjectState::Blocked => "blocked",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a stored state value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown project state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for ProjectState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(ProjectState::Idle),
            "active" => Ok(ProjectState::Active),
            "blocked" => Ok(ProjectState::Blocked),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Snapshot of one project row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project: String,
    pub state: ProjectState,
    /// Job names currently waiting (advisory only)
    #[serde(default)]
    pub waiting: BTreeSet<String>,
}

/// What the caller should do after reading a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Record is idle: attempt the conditional idle -> active write
    Activate,
    /// Someone holds the lock: sleep and read again
    StillActive,
    /// Abort without retrying
    Blocked,
}

impl ProjectRecord {
    /// The record a project gets on first access
    pub fn idle(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            state: ProjectState::Idle,
            waiting: BTreeSet::new(),
        }
    }

    pub fn with_state(mut self, state: ProjectState) -> Self {
        self.state = state;
        self
    }

    pub fn with_waiting(mut self, job: impl Into<String>) -> Self {
        self.waiting.insert(job.into());
        self
    }

    pub fn is_waiting(&self, job: &str) -> bool {
        self.waiting.contains(job)
    }

    /// Pure activation decision for this snapshot
    pub fn decide(&self) -> Decision {
        match self.state {
            ProjectState::Idle => Decision::Activate,
            ProjectState::Active => Decision::StillActive,
            ProjectState::Blocked => Decision::Blocked,
        }
    }
}

/// Result of observing a project, distinguishing lazy creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// The record already existed
    Found(ProjectRecord),
    /// The record was missing and a default idle record was created
    Created(ProjectRecord),
}

impl Observed {
    pub fn record(&self) -> &ProjectRecord {
        match self {
            Observed::Found(record) | Observed::Created(record) => record,
        }
    }

    pub fn into_record(self) -> ProjectRecord {
        match self {
            Observed::Found(record) | Observed::Created(record) => record,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Observed::Created(_))
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
