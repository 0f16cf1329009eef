// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared lock-table adapters
//!
//! The table holds one row per project: `project` (key), `state` and the
//! `waiting` string set. Every mutation goes through the store's own atomic
//! primitives; there is no client-side locking.

mod dynamo;
mod retrying;
mod table;

pub use dynamo::{DynamoStore, DynamoStoreConfig};
pub use retrying::RetryingStore;
pub use table::{ensure_ready, TableControl, TableStatus, TABLE_POLL_INTERVAL};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use sz_core::{Interrupt, Interrupted, ProjectRecord, ProjectState};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Capacity or request-rate limit hit; safe to retry the same call
    #[error("store throughput exceeded: {0}")]
    Throttled(String),
    /// A conditional write lost to a concurrent writer
    #[error("conditional write failed")]
    ConditionFailed,
    /// The table settled in a status other than active
    #[error("unexpected table status: {0}")]
    TableStatus(String),
    #[error("malformed record for project {project}: {reason}")]
    Malformed { project: String, reason: String },
    #[error("store request failed: {0}")]
    Backend(String),
    /// The interrupt fired during a backoff or table-readiness wait
    #[error("interrupted while waiting on the lock table")]
    Interrupted,
}

impl From<Interrupted> for StoreError {
    fn from(_: Interrupted) -> Self {
        StoreError::Interrupted
    }
}

impl StoreError {
    /// Throughput errors are the only ones retried transparently
    pub fn is_throttled(&self) -> bool {
        matches!(self, StoreError::Throttled(_))
    }

    pub fn is_condition_failed(&self) -> bool {
        matches!(self, StoreError::ConditionFailed)
    }
}

/// Condition checked against the stored state at apply time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateGuard {
    /// Stored state equals this value (compare-and-swap)
    Is(ProjectState),
    /// Stored state is anything but this value
    IsNot(ProjectState),
}

impl StateGuard {
    /// Evaluate the guard against a stored state
    pub fn holds(self, stored: ProjectState) -> bool {
        match self {
            StateGuard::Is(expected) => stored == expected,
            StateGuard::IsNot(forbidden) => stored != forbidden,
        }
    }
}

/// How to add a job to the waiting set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMode {
    /// No-op when already present
    Always,
    /// Fail with [`StoreError::ConditionFailed`] when already present
    IfAbsent,
}

/// Adapter for the shared lock table
#[async_trait]
pub trait StoreAdapter: Clone + Send + Sync + 'static {
    /// A handle on the same table whose waits end with
    /// [`StoreError::Interrupted`] once `interrupt` fires.
    ///
    /// Only waits are cut short (throttle backoff, table creation). A request
    /// already sent always completes.
    fn interruptible(&self, interrupt: &Interrupt) -> Self;

    /// Idempotent check-or-create of the backing table.
    ///
    /// Waits while the table is being created; any other non-active status
    /// is [`StoreError::TableStatus`].
    async fn ensure_table(&self) -> Result<(), StoreError>;

    /// Strongly consistent read
    async fn get(&self, project: &str) -> Result<Option<ProjectRecord>, StoreError>;

    /// Create an idle record unless one exists. Losing the race is success.
    async fn create_if_absent(&self, project: &str) -> Result<(), StoreError>;

    /// Conditionally overwrite the state
    async fn set_state(
        &self,
        project: &str,
        guard: StateGuard,
        state: ProjectState,
    ) -> Result<(), StoreError>;

    /// Atomic add to the waiting set
    async fn add_waiting(&self, project: &str, job: &str, mode: AddMode)
        -> Result<(), StoreError>;

    /// Atomic remove from the waiting set; no-op when absent
    async fn remove_waiting(&self, project: &str, job: &str) -> Result<(), StoreError>;

    /// Drop every waiting entry for a project
    async fn clear_waiting(&self, project: &str) -> Result<(), StoreError>;
}
