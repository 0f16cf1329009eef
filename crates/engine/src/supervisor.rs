// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervised execution of the job process

use sz_adapters::{JobExit, JobHandle, JobRunner, ProcessError, ReportAdapter};
use sz_core::{Interrupt, LockEvent, ReapAction, ReapInput, ReapPolicy, Reaper};

/// How a supervised run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The job exited on its own
    Exited(JobExit),
    /// The interrupt fired and the job was reaped
    Interrupted { exit: JobExit },
}

/// Starts a job, waits for it, and shuts it down on interrupt
#[derive(Clone)]
pub struct Supervisor<R, P> {
    runner: R,
    reporter: P,
    policy: ReapPolicy,
}

impl<R: JobRunner, P: ReportAdapter> Supervisor<R, P> {
    pub fn new(runner: R, reporter: P, policy: ReapPolicy) -> Self {
        Self {
            runner,
            reporter,
            policy,
        }
    }

    pub async fn run(&self, job: &str, interrupt: &Interrupt) -> Result<RunOutcome, ProcessError> {
        let mut handle = self.runner.start(job).await?;
        self.reporter.report(&LockEvent::JobStarted {
            job: job.to_string(),
            pid: handle.pid(),
        });

        let waited = tokio::select! {
            result = handle.wait() => Some(result),
            _ = interrupt.triggered() => None,
        };

        match waited {
            Some(Ok(exit)) => {
                tracing::info!(job, exit_code = exit.code(), "job exited");
                self.reporter.report(&LockEvent::JobExited {
                    job: job.to_string(),
                    exit_code: exit.code(),
                });
                Ok(RunOutcome::Exited(exit))
            }
            Some(Err(e)) => {
                // The child may still be running; do not leave it behind
                tracing::error!(job, error = %e, "lost track of job, reaping");
                if let Err(reap_err) = self.reap(job, &mut handle).await {
                    tracing::error!(job, error = %reap_err, "reap failed");
                }
                Err(e)
            }
            None => {
                tracing::info!(job, "interrupted, stopping job");
                let exit = self.reap(job, &mut handle).await?;
                Ok(RunOutcome::Interrupted { exit })
            }
        }
    }

    /// Terminate, then kill, until the job has exited
    pub async fn reap<H: JobHandle>(&self, job: &str, handle: &mut H) -> Result<JobExit, ProcessError> {
        let mut reaper = Reaper::new(self.policy);

        loop {
            let input = match handle.try_wait()? {
                Some(_) => ReapInput::Exited,
                None => ReapInput::StillRunning,
            };
            let (next, action) = reaper.transition(input);
            reaper = next;

            match action {
                ReapAction::Terminate { attempt, wait } => {
                    tracing::debug!(job, attempt, "sending terminate");
                    self.reporter.report(&LockEvent::TerminateRequested {
                        job: job.to_string(),
                        attempt,
                    });
                    handle.terminate()?;
                    tokio::time::sleep(wait).await;
                }
                ReapAction::Kill => {
                    tracing::warn!(job, "job ignored terminate, killing");
                    self.reporter.report(&LockEvent::Killed {
                        job: job.to_string(),
                    });
                    handle.kill()?;
                    handle.wait().await?;
                }
                ReapAction::Done => return handle.wait().await,
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
