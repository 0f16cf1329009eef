// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::process::{JobHandle, JobRunner, ProcessError};
use crate::store::{AddMode, StateGuard, StoreAdapter, StoreError};
use async_trait::async_trait;
use std::future::Future;
use sz_core::{Interrupt, ProjectRecord, ProjectState};
use tracing::Instrument;

/// Run one store call inside `span`, logging elapsed time and outcome
async fn traced_call<T>(
    span: tracing::Span,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    async move {
        let start = std::time::Instant::now();
        let result = call.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::debug!(elapsed_ms, "ok"),
            // Expected under contention; the caller re-decides
            Err(StoreError::ConditionFailed) => {
                tracing::debug!(elapsed_ms, "condition failed")
            }
            Err(StoreError::Interrupted) => tracing::info!(elapsed_ms, "interrupted"),
            Err(e @ StoreError::Throttled(_)) => {
                tracing::warn!(elapsed_ms, error = %e, "throttled")
            }
            Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Wrapper that adds tracing to any StoreAdapter
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: StoreAdapter> StoreAdapter for TracedStore<S> {
    fn interruptible(&self, interrupt: &Interrupt) -> Self {
        Self::new(self.inner.interruptible(interrupt))
    }

    async fn ensure_table(&self) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.ensure_table");
        traced_call(span, self.inner.ensure_table()).await
    }

    async fn get(&self, project: &str) -> Result<Option<ProjectRecord>, StoreError> {
        let span = tracing::debug_span!("store.get", project);
        let result = traced_call(span, self.inner.get(project)).await;
        if let Ok(record) = &result {
            tracing::trace!(
                project,
                state = record.as_ref().map(|r| r.state.as_str()),
                waiting = record.as_ref().map(|r| r.waiting.len()),
                "read"
            );
        }
        result
    }

    async fn create_if_absent(&self, project: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.create_if_absent", project);
        traced_call(span, self.inner.create_if_absent(project)).await
    }

    async fn set_state(
        &self,
        project: &str,
        guard: StateGuard,
        state: ProjectState,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "store.set_state",
            project,
            guard = ?guard,
            state = state.as_str()
        );
        traced_call(span, self.inner.set_state(project, guard, state)).await
    }

    async fn add_waiting(
        &self,
        project: &str,
        job: &str,
        mode: AddMode,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.add_waiting", project, job, mode = ?mode);
        traced_call(span, self.inner.add_waiting(project, job, mode)).await
    }

    async fn remove_waiting(&self, project: &str, job: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.remove_waiting", project, job);
        traced_call(span, self.inner.remove_waiting(project, job)).await
    }

    async fn clear_waiting(&self, project: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.clear_waiting", project);
        traced_call(span, self.inner.clear_waiting(project)).await
    }
}

/// Wrapper that adds tracing to any JobRunner
#[derive(Clone)]
pub struct TracedJobRunner<R> {
    inner: R,
}

impl<R> TracedJobRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: JobRunner> JobRunner for TracedJobRunner<R> {
    type Handle = R::Handle;

    async fn start(&self, job: &str) -> Result<R::Handle, ProcessError> {
        let span = tracing::info_span!("job.start", job);
        async {
            tracing::info!("starting");
            let result = self.inner.start(job).await;
            match &result {
                Ok(handle) => tracing::info!(pid = handle.pid(), "job started"),
                Err(e) => tracing::error!(error = %e, "launch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
