// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake reporter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::ReportAdapter;
use std::sync::{Arc, Mutex};
use sz_core::LockEvent;

/// Reporter that records every event
#[derive(Clone, Default)]
pub struct FakeReporter {
    events: Arc<Mutex<Vec<LockEvent>>>,
}

impl FakeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events
    pub fn events(&self) -> Vec<LockEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event names in order, e.g. `lock:waiting`
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(LockEvent::name).collect()
    }
}

impl ReportAdapter for FakeReporter {
    fn report(&self, event: &LockEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
