// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store wrapper that retries throttled calls

use super::{AddMode, StateGuard, StoreAdapter, StoreError};
use async_trait::async_trait;
use sz_core::{Backoff, Interrupt, ProjectRecord, ProjectState};

/// Wrapper that applies one [`Backoff`] policy to every store call.
///
/// Only [`StoreError::Throttled`] is retried. Conditional-write conflicts
/// pass through so the caller can re-read and decide again.
#[derive(Clone)]
pub struct RetryingStore<S> {
    inner: S,
    policy: Backoff,
    interrupt: Interrupt,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: S, policy: Backoff) -> Self {
        Self {
            inner,
            policy,
            interrupt: Interrupt::never(),
        }
    }
}

#[async_trait]
impl<S: StoreAdapter> StoreAdapter for RetryingStore<S> {
    fn interruptible(&self, interrupt: &Interrupt) -> Self {
        Self {
            inner: self.inner.interruptible(interrupt),
            policy: self.policy.clone(),
            interrupt: interrupt.clone(),
        }
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        self.policy
            .retry("ensure_table", &self.interrupt, StoreError::is_throttled, || {
                self.inner.ensure_table()
            })
            .await
    }

    async fn get(&self, project: &str) -> Result<Option<ProjectRecord>, StoreError> {
        self.policy
            .retry("get", &self.interrupt, StoreError::is_throttled, || {
                self.inner.get(project)
            })
            .await
    }

    async fn create_if_absent(&self, project: &str) -> Result<(), StoreError> {
        self.policy
            .retry("create_if_absent", &self.interrupt, StoreError::is_throttled, || {
                self.inner.create_if_absent(project)
            })
            .await
    }

    async fn set_state(
        &self,
        project: &str,
        guard: StateGuard,
        state: ProjectState,
    ) -> Result<(), StoreError> {
        self.policy
            .retry("set_state", &self.interrupt, StoreError::is_throttled, || {
                self.inner.set_state(project, guard, state)
            })
            .await
    }

    async fn add_waiting(
        &self,
        project: &str,
        job: &str,
        mode: AddMode,
    ) -> Result<(), StoreError> {
        self.policy
            .retry("add_waiting", &self.interrupt, StoreError::is_throttled, || {
                self.inner.add_waiting(project, job, mode)
            })
            .await
    }

    async fn remove_waiting(&self, project: &str, job: &str) -> Result<(), StoreError> {
        self.policy
            .retry("remove_waiting", &self.interrupt, StoreError::is_throttled, || {
                self.inner.remove_waiting(project, job)
            })
            .await
    }

    async fn clear_waiting(&self, project: &str) -> Result<(), StoreError> {
        self.policy
            .retry("clear_waiting", &self.interrupt, StoreError::is_throttled, || {
                self.inner.clear_waiting(project)
            })
            .await
    }
}

#[cfg(test)]
#[path = "retrying_tests.rs"]
mod tests;
