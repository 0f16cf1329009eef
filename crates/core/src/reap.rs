// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reap state machine for a job process that must be shut down
//!
//! Running -> TerminateRequested(n) -> (Exited | KillRequested) -> Exited
//!
//! The machine is pure: the supervisor feeds it what `try_wait` observed and
//! performs the returned action.

use std::time::Duration;

/// How hard to try before force-killing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReapPolicy {
    /// Graceful terminate requests before escalating
    pub terminate_attempts: u32,
    /// Wait after each terminate request
    pub terminate_interval: Duration,
}

impl Default for ReapPolicy {
    fn default() -> Self {
        Self {
            terminate_attempts: 5,
            terminate_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapState {
    Running,
    TerminateRequested { attempts: u32 },
    KillRequested,
    Exited { forced: bool },
}

/// What `try_wait` reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapInput {
    StillRunning,
    Exited,
}

/// What the supervisor must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapAction {
    /// Send a graceful terminate, then sleep before polling again
    Terminate { attempt: u32, wait: Duration },
    /// Force-kill and wait for the exit
    Kill,
    /// Nothing left to do
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct Reaper {
    pub policy: ReapPolicy,
    pub state: ReapState,
}

impl Reaper {
    pub fn new(policy: ReapPolicy) -> Self {
        Self {
            policy,
            state: ReapState::Running,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, ReapState::Exited { .. })
    }

    /// Pure state transition function
    pub fn transition(&self, input: ReapInput) -> (Reaper, ReapAction) {
        let mut next = *self;

        let action = match (self.state, input) {
            (ReapState::Exited { .. }, _) => ReapAction::Done,

            (ReapState::KillRequested, _) => {
                next.state = ReapState::Exited { forced: true };
                ReapAction::Done
            }

            (_, ReapInput::Exited) => {
                next.state = ReapState::Exited { forced: false };
                ReapAction::Done
            }

            (ReapState::Running, ReapInput::StillRunning) => {
                self.request_terminate(&mut next, 1)
            }

            (ReapState::TerminateRequested { attempts }, ReapInput::StillRunning) => {
                self.request_terminate(&mut next, attempts + 1)
            }
        };

        (next, action)
    }

    fn request_terminate(&self, next: &mut Reaper, attempt: u32) -> ReapAction {
        if attempt > self.policy.terminate_attempts {
            next.state = ReapState::KillRequested;
            ReapAction::Kill
        } else {
            next.state = ReapState::TerminateRequested { attempts: attempt };
            ReapAction::Terminate {
                attempt,
                wait: self.policy.terminate_interval,
            }
        }
    }
}

#[cfg(test)]
#[path = "reap_tests.rs"]
mod tests;
