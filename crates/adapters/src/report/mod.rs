// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing progress reporting

mod terminal;

pub use terminal::TerminalReporter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReporter;

use sz_core::LockEvent;

/// Sink for lock events shown to the person running the job.
///
/// Reporting never fails the protocol; implementations swallow their own
/// write errors.
pub trait ReportAdapter: Clone + Send + Sync + 'static {
    fn report(&self, event: &LockEvent);
}
