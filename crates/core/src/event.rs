// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress events emitted while serializing a job
//!
//! The engine reports what it is doing through these values instead of
//! writing to the console itself; the reporter adapter decides how they look.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LockEvent {
    /// Registered as waiting, about to poll for the lock
    Waiting { project: String, job: String },
    /// One activation attempt was made
    Polled {
        project: String,
        job: String,
        attempt: u64,
    },
    /// Won the idle -> active transition
    Activated { project: String, job: String },
    /// The same job is already waiting on this project
    AlreadyWaiting { project: String, job: String },
    /// The project is administratively blocked
    Blocked { project: String, job: String },
    /// Gave up after the configured maximum wait
    TimedOut { project: String, job: String },
    /// Job process launched
    JobStarted { job: String, pid: Option<u32> },
    /// Job process exited on its own
    JobExited { job: String, exit_code: i32 },
    /// Graceful terminate sent to a job that is still running
    TerminateRequested { job: String, attempt: u32 },
    /// Job ignored every terminate request and was killed
    Killed { job: String },
    /// Project returned to idle
    Deactivated { project: String },
    /// The orchestrator itself was interrupted
    Interrupted { project: String, job: String },
}

impl LockEvent {
    /// Returns the event name in the format "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            LockEvent::Waiting { .. } => "lock:waiting",
            LockEvent::Polled { .. } => "lock:polled",
            LockEvent::Activated { .. } => "lock:activated",
            LockEvent::AlreadyWaiting { .. } => "lock:already_waiting",
            LockEvent::Blocked { .. } => "lock:blocked",
            LockEvent::TimedOut { .. } => "lock:timed_out",
            LockEvent::Deactivated { .. } => "lock:deactivated",
            LockEvent::JobStarted { .. } => "job:started",
            LockEvent::JobExited { .. } => "job:exited",
            LockEvent::TerminateRequested { .. } => "job:terminate_requested",
            LockEvent::Killed { .. } => "job:killed",
            LockEvent::Interrupted { .. } => "serialize:interrupted",
        }
    }

    /// Whether this event ends the waiting phase
    pub fn ends_wait(&self) -> bool {
        matches!(
            self,
            LockEvent::Activated { .. }
                | LockEvent::Blocked { .. }
                | LockEvent::TimedOut { .. }
                | LockEvent::Interrupted { .. }
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
