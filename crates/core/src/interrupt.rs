// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation
//!
//! The binary owns the [`InterruptTrigger`] and fires it from its signal
//! handler; everything else only observes an [`Interrupt`]. Observation
//! happens at suspension points (backoff and poll sleeps, the job wait),
//! never in the middle of a store call, so a conditional write is never
//! abandoned with an unknown result.

use thiserror::Error;
use tokio::sync::watch;

/// Create a connected trigger and interrupt
pub fn interrupt_channel() -> (InterruptTrigger, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (InterruptTrigger { tx }, Interrupt { rx })
}

/// A wait was cut short by the interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Fires the interrupt. Firing more than once is harmless.
#[derive(Clone)]
pub struct InterruptTrigger {
    tx: watch::Sender<bool>,
}

impl InterruptTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Observer side of the interrupt channel
#[derive(Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::never()
    }
}

impl Interrupt {
    /// An interrupt that never fires
    pub fn never() -> Self {
        let (_trigger, interrupt) = interrupt_channel();
        interrupt
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the interrupt fires; pends forever if the trigger is
    /// dropped without firing.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless the interrupt fires first
    pub async fn sleep(&self, duration: std::time::Duration) -> Result<(), Interrupted> {
        tokio::select! {
            biased;
            _ = self.triggered() => Err(Interrupted),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "interrupt_tests.rs"]
mod tests;
