// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock table for testing
//!
//! Conditional writes are evaluated under one mutex, so racing callers get
//! the same compare-and-swap guarantees the real table provides.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::table::{ensure_ready, TableControl, TableStatus};
use super::{AddMode, StateGuard, StoreAdapter, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sz_core::{Interrupt, ProjectRecord, ProjectState};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    EnsureTable,
    DescribeTable,
    CreateTable,
    Get {
        project: String,
    },
    CreateIfAbsent {
        project: String,
    },
    SetState {
        project: String,
        guard: StateGuard,
        state: ProjectState,
    },
    AddWaiting {
        project: String,
        job: String,
        mode: AddMode,
    },
    RemoveWaiting {
        project: String,
        job: String,
    },
    ClearWaiting {
        project: String,
    },
}

struct FakeTable {
    records: HashMap<String, ProjectRecord>,
    exists: bool,
    /// Scripted describe results, consumed front to back
    statuses: VecDeque<TableStatus>,
    /// Number of upcoming record operations that fail as throttled
    throttle_remaining: u32,
    /// Error returned by the next record operation
    fail_next: Option<StoreError>,
}

impl Default for FakeTable {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            exists: true,
            statuses: VecDeque::new(),
            throttle_remaining: 0,
            fail_next: None,
        }
    }
}

/// Fake lock table for testing
#[derive(Clone, Default)]
pub struct FakeStore {
    table: Arc<Mutex<FakeTable>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    interrupt: Interrupt,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose table does not exist yet
    pub fn without_table() -> Self {
        let store = Self::default();
        store.lock_table().exists = false;
        store
    }

    /// Script the statuses returned by upcoming describe calls
    pub fn with_table_statuses(self, statuses: impl IntoIterator<Item = TableStatus>) -> Self {
        self.lock_table().statuses.extend(statuses);
        self
    }

    /// Seed or overwrite a record, bypassing conditions (administrative edit)
    pub fn insert(&self, record: ProjectRecord) {
        self.lock_table()
            .records
            .insert(record.project.clone(), record);
    }

    /// Overwrite a project's state, creating the record if needed
    pub fn force_state(&self, project: &str, state: ProjectState) {
        self.lock_table()
            .records
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord::idle(project))
            .state = state;
    }

    /// Current record, without recording a call
    pub fn record(&self, project: &str) -> Option<ProjectRecord> {
        self.lock_table().records.get(project).cloned()
    }

    pub fn table_exists(&self) -> bool {
        self.lock_table().exists
    }

    /// Fail the next `n` record operations with [`StoreError::Throttled`]
    pub fn throttle_next(&self, n: u32) {
        self.lock_table().throttle_remaining = n;
    }

    /// Fail the next record operation with `error`
    pub fn fail_next(&self, error: StoreError) {
        self.lock_table().fail_next = Some(error);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Count recorded calls matching a predicate
    pub fn count_calls(&self, matches: impl Fn(&StoreCall) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, FakeTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_call(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    /// Record the call, then apply injected failures
    fn begin(&self, call: StoreCall) -> Result<std::sync::MutexGuard<'_, FakeTable>, StoreError> {
        self.record_call(call);
        let mut table = self.lock_table();
        if let Some(error) = table.fail_next.take() {
            return Err(error);
        }
        if table.throttle_remaining > 0 {
            table.throttle_remaining -= 1;
            return Err(StoreError::Throttled(
                "ProvisionedThroughputExceededException".to_string(),
            ));
        }
        if !table.exists {
            return Err(StoreError::Backend("ResourceNotFoundException".to_string()));
        }
        Ok(table)
    }
}

#[async_trait]
impl TableControl for FakeStore {
    async fn describe(&self) -> Result<TableStatus, StoreError> {
        self.record_call(StoreCall::DescribeTable);
        let mut table = self.lock_table();
        if let Some(status) = table.statuses.pop_front() {
            return Ok(status);
        }
        Ok(if table.exists {
            TableStatus::Active
        } else {
            TableStatus::Missing
        })
    }

    async fn create(&self) -> Result<(), StoreError> {
        self.record_call(StoreCall::CreateTable);
        self.lock_table().exists = true;
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for FakeStore {
    fn interruptible(&self, interrupt: &Interrupt) -> Self {
        Self {
            interrupt: interrupt.clone(),
            ..self.clone()
        }
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        self.record_call(StoreCall::EnsureTable);
        ensure_ready(self, Duration::from_secs(1), &self.interrupt).await
    }

    async fn get(&self, project: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let table = self.begin(StoreCall::Get {
            project: project.to_string(),
        })?;
        Ok(table.records.get(project).cloned())
    }

    async fn create_if_absent(&self, project: &str) -> Result<(), StoreError> {
        let mut table = self.begin(StoreCall::CreateIfAbsent {
            project: project.to_string(),
        })?;
        table
            .records
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord::idle(project));
        Ok(())
    }

    async fn set_state(
        &self,
        project: &str,
        guard: StateGuard,
        state: ProjectState,
    ) -> Result<(), StoreError> {
        let mut table = self.begin(StoreCall::SetState {
            project: project.to_string(),
            guard,
            state,
        })?;
        // A missing row has no state attribute, which reads as idle
        let stored = table
            .records
            .get(project)
            .map(|r| r.state)
            .unwrap_or(ProjectState::Idle);
        if !guard.holds(stored) {
            return Err(StoreError::ConditionFailed);
        }
        table
            .records
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord::idle(project))
            .state = state;
        Ok(())
    }

    async fn add_waiting(
        &self,
        project: &str,
        job: &str,
        mode: AddMode,
    ) -> Result<(), StoreError> {
        let mut table = self.begin(StoreCall::AddWaiting {
            project: project.to_string(),
            job: job.to_string(),
            mode,
        })?;
        let record = table
            .records
            .entry(project.to_string())
            .or_insert_with(|| ProjectRecord::idle(project));
        if !record.waiting.insert(job.to_string()) && mode == AddMode::IfAbsent {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    async fn remove_waiting(&self, project: &str, job: &str) -> Result<(), StoreError> {
        let mut table = self.begin(StoreCall::RemoveWaiting {
            project: project.to_string(),
            job: job.to_string(),
        })?;
        if let Some(record) = table.records.get_mut(project) {
            record.waiting.remove(job);
        }
        Ok(())
    }

    async fn clear_waiting(&self, project: &str) -> Result<(), StoreError> {
        let mut table = self.begin(StoreCall::ClearWaiting {
            project: project.to_string(),
        })?;
        if let Some(record) = table.records.get_mut(project) {
            record.waiting.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
