// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the lock table, the job process and the console

pub mod process;
pub mod report;
pub mod store;
pub mod traced;

pub use process::{ChildHandle, CommandRunner, JobExit, JobHandle, JobRunner, ProcessError};
pub use report::{ReportAdapter, TerminalReporter};
pub use store::{
    AddMode, DynamoStore, DynamoStoreConfig, RetryingStore, StateGuard, StoreAdapter, StoreError,
};
pub use traced::{TracedJobRunner, TracedStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeJobHandle, FakeJobRunner, JobScript, ProcessCall};
#[cfg(any(test, feature = "test-support"))]
pub use report::FakeReporter;
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
