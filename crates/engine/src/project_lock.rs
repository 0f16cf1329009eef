// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project lock protocol over the shared table
//!
//! The only mutual-exclusion mechanism is the store's conditional write on
//! `state`: a caller that reads `idle` still has to win the
//! `idle -> active` compare-and-swap. Losing that race is not an error;
//! the caller re-reads on its next poll.

use std::time::Duration;
use sz_adapters::{AddMode, StateGuard, StoreAdapter, StoreError};
use sz_core::config::LockConfig;
use sz_core::{Decision, Interrupt, Observed, ProjectRecord, ProjectState};
use tokio::time::Instant;

/// Result of one activation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// This caller now holds the project
    Activated(ProjectRecord),
    /// Someone else holds it, or won the race just now
    StillActive,
    Blocked,
}

/// Result of waiting for the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Activated(ProjectRecord),
    Blocked,
    TimedOut,
    Interrupted,
}

/// Result of adding a job to the waiting set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The same job was already waiting; the caller should not proceed
    AlreadyWaiting,
}

/// How long and how often to poll for activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// Unbounded when unset
    pub max_wait: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_wait: None,
        }
    }
}

impl From<&LockConfig> for WaitPolicy {
    fn from(config: &LockConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            max_wait: config.max_wait,
        }
    }
}

/// Lock protocol for projects in one table
#[derive(Clone)]
pub struct ProjectLock<S> {
    store: S,
}

impl<S: StoreAdapter> ProjectLock<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The same lock whose store waits end once `interrupt` fires.
    ///
    /// Use it for setup and activation only; releasing must go through a
    /// handle that keeps retrying.
    pub fn interruptible(&self, interrupt: &Interrupt) -> Self {
        Self::new(self.store.interruptible(interrupt))
    }

    /// Read the record, creating an idle one when the project is new
    pub async fn observe(&self, project: &str) -> Result<Observed, StoreError> {
        if let Some(record) = self.store.get(project).await? {
            return Ok(Observed::Found(record));
        }
        self.store.create_if_absent(project).await?;
        tracing::debug!(project, "created project record");
        Ok(Observed::Created(ProjectRecord::idle(project)))
    }

    /// One read-decide-swap round
    pub async fn try_activate(&self, project: &str) -> Result<Activation, StoreError> {
        let record = self.observe(project).await?.into_record();

        match record.decide() {
            Decision::Blocked => Ok(Activation::Blocked),
            Decision::StillActive => Ok(Activation::StillActive),
            Decision::Activate => {
                match self
                    .store
                    .set_state(project, StateGuard::Is(ProjectState::Idle), ProjectState::Active)
                    .await
                {
                    Ok(()) => Ok(Activation::Activated(
                        record.with_state(ProjectState::Active),
                    )),
                    Err(StoreError::ConditionFailed) => {
                        tracing::debug!(project, "lost activation race");
                        Ok(Activation::StillActive)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Poll until the project is ours, blocked, the deadline passes or the
    /// interrupt fires.
    ///
    /// `on_poll` is called with the 1-based attempt number before each
    /// activation attempt.
    pub async fn wait_for_activation(
        &self,
        project: &str,
        policy: &WaitPolicy,
        interrupt: &Interrupt,
        mut on_poll: impl FnMut(u64) + Send,
    ) -> Result<WaitOutcome, StoreError> {
        let deadline = policy.max_wait.map(|max| Instant::now() + max);
        let mut attempt: u64 = 0;

        loop {
            if interrupt.is_triggered() {
                return Ok(WaitOutcome::Interrupted);
            }

            attempt += 1;
            on_poll(attempt);
            match self.try_activate(project).await? {
                Activation::Activated(record) => {
                    tracing::info!(project, attempt, "activated");
                    return Ok(WaitOutcome::Activated(record));
                }
                Activation::Blocked => {
                    tracing::info!(project, attempt, "project is blocked");
                    return Ok(WaitOutcome::Blocked);
                }
                Activation::StillActive => {}
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(project, attempt, "gave up waiting");
                return Ok(WaitOutcome::TimedOut);
            }

            tokio::select! {
                _ = tokio::time::sleep(policy.poll_interval) => {}
                _ = interrupt.triggered() => return Ok(WaitOutcome::Interrupted),
            }
        }
    }

    /// Return the project to idle unless it was blocked meanwhile
    pub async fn deactivate(&self, project: &str) -> Result<(), StoreError> {
        match self
            .store
            .set_state(
                project,
                StateGuard::IsNot(ProjectState::Blocked),
                ProjectState::Idle,
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::ConditionFailed) => {
                tracing::warn!(project, "project was blocked while active, leaving it blocked");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn register_waiting(
        &self,
        project: &str,
        job: &str,
    ) -> Result<Registration, StoreError> {
        match self
            .store
            .add_waiting(project, job, AddMode::IfAbsent)
            .await
        {
            Ok(()) => Ok(Registration::Registered),
            Err(StoreError::ConditionFailed) => Ok(Registration::AlreadyWaiting),
            Err(e) => Err(e),
        }
    }

    /// Idempotent
    pub async fn unregister_waiting(&self, project: &str, job: &str) -> Result<(), StoreError> {
        self.store.remove_waiting(project, job).await
    }

    /// Drop every waiting entry, e.g. ones left behind by a crashed host
    pub async fn reset_waiting(&self, project: &str) -> Result<(), StoreError> {
        tracing::info!(project, "clearing waiting set");
        self.store.clear_waiting(project).await
    }
}

#[cfg(test)]
#[path = "project_lock_tests.rs"]
mod tests;
