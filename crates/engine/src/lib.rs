// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Serialize engine: the per-project lock protocol and supervised job runs

mod error;
mod project_lock;
mod serializer;
mod supervisor;

pub use error::SerializeError;
pub use project_lock::{Activation, ProjectLock, Registration, WaitOutcome, WaitPolicy};
pub use serializer::{
    Outcome, Serializer, SerializerConfig, SerializerDeps, SkipReason, EXIT_INTERRUPTED,
    EXIT_TIMED_OUT,
};
pub use supervisor::{RunOutcome, Supervisor};
pub use sz_core::{interrupt_channel, Interrupt, InterruptTrigger};
