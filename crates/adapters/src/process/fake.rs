// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{JobExit, JobHandle, JobRunner, ProcessError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const SIGTERM: i32 = 15;
const SIGKILL: i32 = 9;

/// Scripted behavior of one fake job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobScript {
    /// Exit with `code` after `after` (immediately when zero)
    Exit { after: Duration, code: i32 },
    /// Run until signalled; SIGTERM is ignored unless `honors_terminate`
    Hang { honors_terminate: bool },
    /// Fail to launch
    LaunchFailure,
}

impl JobScript {
    pub fn exits(code: i32) -> Self {
        JobScript::Exit {
            after: Duration::ZERO,
            code,
        }
    }
}

/// Recorded process call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    Start { job: String },
    Terminate { job: String },
    Kill { job: String },
}

/// Fake job runner for testing
#[derive(Clone)]
pub struct FakeJobRunner {
    scripts: Arc<Mutex<VecDeque<JobScript>>>,
    calls: Arc<Mutex<Vec<ProcessCall>>>,
    next_pid: Arc<AtomicU32>,
}

impl Default for FakeJobRunner {
    fn default() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_pid: Arc::new(AtomicU32::new(1000)),
        }
    }
}

impl FakeJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the behavior of the next started job. Unscripted jobs exit 0.
    pub fn push(&self, script: JobScript) -> &Self {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(script);
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of started jobs, in order
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProcessCall::Start { job } => Some(job),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProcessCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl JobRunner for FakeJobRunner {
    type Handle = FakeJobHandle;

    async fn start(&self, job: &str) -> Result<FakeJobHandle, ProcessError> {
        self.record(ProcessCall::Start {
            job: job.to_string(),
        });
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| JobScript::exits(0));

        let (exit_tx, exit_rx) = watch::channel(None);
        let honors_terminate = match script {
            JobScript::LaunchFailure => {
                return Err(ProcessError::Launch {
                    program: "fake".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted failure"),
                });
            }
            JobScript::Exit { after, code } if after.is_zero() => {
                exit_tx.send_replace(Some(JobExit::Code(code)));
                true
            }
            JobScript::Exit { after, code } => {
                let tx = exit_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    tx.send_if_modified(|exit| exit_once(exit, JobExit::Code(code)));
                });
                true
            }
            JobScript::Hang { honors_terminate } => honors_terminate,
        };

        Ok(FakeJobHandle {
            job: job.to_string(),
            pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
            honors_terminate,
            exit_tx,
            exit_rx,
            runner: self.clone(),
        })
    }
}

/// Set the exit once; later exits are ignored
fn exit_once(slot: &mut Option<JobExit>, exit: JobExit) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(exit);
    true
}

/// Handle to a fake job
pub struct FakeJobHandle {
    job: String,
    pid: u32,
    honors_terminate: bool,
    exit_tx: watch::Sender<Option<JobExit>>,
    exit_rx: watch::Receiver<Option<JobExit>>,
    runner: FakeJobRunner,
}

#[async_trait]
impl JobHandle for FakeJobHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn wait(&mut self) -> Result<JobExit, ProcessError> {
        let exit = *self
            .exit_rx
            .wait_for(Option::is_some)
            .await
            .map_err(|e| ProcessError::Wait(std::io::Error::other(e.to_string())))?;
        Ok(exit.unwrap_or(JobExit::Code(1)))
    }

    fn try_wait(&mut self) -> Result<Option<JobExit>, ProcessError> {
        Ok(*self.exit_rx.borrow())
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        self.runner.record(ProcessCall::Terminate {
            job: self.job.clone(),
        });
        if self.honors_terminate {
            self.exit_tx
                .send_if_modified(|exit| exit_once(exit, JobExit::Signaled(SIGTERM)));
        }
        Ok(())
    }

    fn kill(&mut self) -> Result<(), ProcessError> {
        self.runner.record(ProcessCall::Kill {
            job: self.job.clone(),
        });
        self.exit_tx
            .send_if_modified(|exit| exit_once(exit, JobExit::Signaled(SIGKILL)));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
