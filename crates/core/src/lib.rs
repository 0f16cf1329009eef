// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sz-core: domain model for serialize
//!
//! This crate provides:
//! - The project lock record and its pure activation decision
//! - The retry policy applied to store calls
//! - The interrupt channel that cuts waits short
//! - The reap state machine for shutting down a job process
//! - Progress events and the configuration model

pub mod backoff;
pub mod config;
pub mod event;
pub mod interrupt;
pub mod project;
pub mod reap;

// Re-exports
pub use backoff::Backoff;
pub use config::{ConfigError, SerializeConfig};
pub use event::LockEvent;
pub use interrupt::{interrupt_channel, Interrupt, InterruptTrigger, Interrupted};
pub use project::{Decision, Observed, ProjectRecord, ProjectState, UnknownState};
pub use reap::{ReapAction, ReapInput, ReapPolicy, ReapState, Reaper};
