// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialize one job against one project
//!
//! ```text
//! ensure table -> observe -> register waiting
//!   -> poll for activation            (always unregister afterwards)
//!   -> run job                        (always deactivate afterwards)
//! ```
//!
//! Cleanup is async, so it cannot live in `Drop`. Each protected step's
//! result is captured, the cleanup is awaited, and then the captured result
//! is returned. A cleanup failure never masks the protected step's error.
//!
//! Setup and activation go through an interruptible view of the lock, so
//! throttle backoff and table polling end on the interrupt. Cleanup uses
//! the plain lock and keeps retrying.

use crate::error::SerializeError;
use crate::project_lock::{ProjectLock, Registration, WaitOutcome, WaitPolicy};
use crate::supervisor::{RunOutcome, Supervisor};
use sz_adapters::{JobRunner, ReportAdapter, StoreAdapter, StoreError};
use sz_core::{Interrupt, LockEvent, ReapPolicy, SerializeConfig};
use tracing::Instrument;

/// Exit code when a bounded wait runs out
pub const EXIT_TIMED_OUT: i32 = 3;
/// Exit code when the run was interrupted
pub const EXIT_INTERRUPTED: i32 = 130;

/// Why a job was not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyWaiting,
}

/// How a serialize run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed { exit_code: i32 },
    Skipped(SkipReason),
    Blocked,
    TimedOut,
    Interrupted,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed { exit_code } => exit_code,
            Outcome::Skipped(_) | Outcome::Blocked => 0,
            Outcome::TimedOut => EXIT_TIMED_OUT,
            Outcome::Interrupted => EXIT_INTERRUPTED,
        }
    }
}

/// Adapter dependencies
pub struct SerializerDeps<S, R, P> {
    pub store: S,
    pub runner: R,
    pub reporter: P,
}

/// Tunables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerConfig {
    pub wait: WaitPolicy,
    pub reap: ReapPolicy,
}

impl From<&SerializeConfig> for SerializerConfig {
    fn from(config: &SerializeConfig) -> Self {
        Self {
            wait: WaitPolicy::from(&config.lock),
            reap: config.runner.reap_policy(),
        }
    }
}

/// Runs jobs under the per-project lock
pub struct Serializer<S, R, P> {
    lock: ProjectLock<S>,
    supervisor: Supervisor<R, P>,
    reporter: P,
    wait: WaitPolicy,
}

impl<S, R, P> Serializer<S, R, P>
where
    S: StoreAdapter,
    R: JobRunner,
    P: ReportAdapter,
{
    pub fn new(deps: SerializerDeps<S, R, P>, config: SerializerConfig) -> Self {
        Self {
            lock: ProjectLock::new(deps.store),
            supervisor: Supervisor::new(deps.runner, deps.reporter.clone(), config.reap),
            reporter: deps.reporter,
            wait: config.wait,
        }
    }

    pub fn lock(&self) -> &ProjectLock<S> {
        &self.lock
    }

    pub async fn serialize(
        &self,
        project: &str,
        job: &str,
        interrupt: &Interrupt,
    ) -> Result<Outcome, SerializeError> {
        let span = tracing::info_span!("serialize", project, job);
        self.serialize_inner(project, job, interrupt)
            .instrument(span)
            .await
    }

    async fn serialize_inner(
        &self,
        project: &str,
        job: &str,
        interrupt: &Interrupt,
    ) -> Result<Outcome, SerializeError> {
        let session = self.lock.interruptible(interrupt);

        match session.store().ensure_table().await {
            Err(StoreError::Interrupted) => return Ok(self.interrupted(project, job)),
            ready => ready?,
        }
        let observed = match session.observe(project).await {
            Err(StoreError::Interrupted) => return Ok(self.interrupted(project, job)),
            observed => observed?,
        };
        tracing::debug!(
            created = observed.was_created(),
            state = %observed.record().state,
            "observed"
        );

        // An interrupted add was throttled, never applied: there is nothing
        // to unregister, and a same-named entry belongs to another run.
        let registration = match session.register_waiting(project, job).await {
            Err(StoreError::Interrupted) => return Ok(self.interrupted(project, job)),
            registration => registration?,
        };
        if registration == Registration::AlreadyWaiting {
            self.report(LockEvent::AlreadyWaiting {
                project: project.to_string(),
                job: job.to_string(),
            });
            return Ok(Outcome::Skipped(SkipReason::AlreadyWaiting));
        }

        // Polling scope: leaves the waiting set on every path
        self.report(LockEvent::Waiting {
            project: project.to_string(),
            job: job.to_string(),
        });
        let waited = session
            .wait_for_activation(project, &self.wait, interrupt, |attempt| {
                self.report(LockEvent::Polled {
                    project: project.to_string(),
                    job: job.to_string(),
                    attempt,
                })
            })
            .await;
        if let Err(e) = self.lock.unregister_waiting(project, job).await {
            // Advisory only; a stale entry is cleared with reset-waiting
            tracing::error!(error = %e, "failed to leave waiting set");
        }

        // A throttled swap was never applied, so the project is not ours
        let waited = match waited {
            Err(StoreError::Interrupted) => Ok(WaitOutcome::Interrupted),
            waited => waited,
        };
        match waited? {
            WaitOutcome::Activated(_) => self.report(LockEvent::Activated {
                project: project.to_string(),
                job: job.to_string(),
            }),
            WaitOutcome::Blocked => {
                self.report(LockEvent::Blocked {
                    project: project.to_string(),
                    job: job.to_string(),
                });
                return Ok(Outcome::Blocked);
            }
            WaitOutcome::TimedOut => {
                self.report(LockEvent::TimedOut {
                    project: project.to_string(),
                    job: job.to_string(),
                });
                return Ok(Outcome::TimedOut);
            }
            WaitOutcome::Interrupted => return Ok(self.interrupted(project, job)),
        }

        // Execution scope: leaves the project idle on every path
        let ran = if interrupt.is_triggered() {
            None
        } else {
            Some(self.supervisor.run(job, interrupt).await)
        };
        let released = self.lock.deactivate(project).await;
        if released.is_ok() {
            self.report(LockEvent::Deactivated {
                project: project.to_string(),
            });
        }

        let outcome = match ran {
            None | Some(Ok(RunOutcome::Interrupted { .. })) => Outcome::Interrupted,
            Some(Ok(RunOutcome::Exited(exit))) => Outcome::Completed {
                exit_code: exit.code(),
            },
            Some(Err(e)) => {
                if let Err(release_err) = released {
                    tracing::error!(error = %release_err, "failed to release project");
                }
                return Err(e.into());
            }
        };
        if let Err(source) = released {
            return Err(SerializeError::Release {
                project: project.to_string(),
                source,
            });
        }
        if outcome == Outcome::Interrupted {
            return Ok(self.interrupted(project, job));
        }
        Ok(outcome)
    }

    fn report(&self, event: LockEvent) {
        self.reporter.report(&event);
    }

    fn interrupted(&self, project: &str, job: &str) -> Outcome {
        self.report(LockEvent::Interrupted {
            project: project.to_string(),
            job: job.to_string(),
        });
        Outcome::Interrupted
    }
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;
