// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy for store calls
//!
//! A [`Backoff`] pairs a constant delay with an optional attempt bound. The
//! retryable-error predicate is supplied per call, so the same policy can
//! retry throttling on every store operation without also swallowing
//! conditional-write conflicts the caller wants to see.

use crate::interrupt::{Interrupt, Interrupted};
use std::future::Future;
use std::time::Duration;

/// Retry policy applied to store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    /// Same delay before every retry
    pub delay: Duration,
    /// Total attempts including the first; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::constant(Duration::from_secs(1))
    }
}

impl Backoff {
    /// Unbounded retries with a fixed delay
    pub fn constant(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempts < max,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt bound is exhausted.
    ///
    /// The interrupt is only observed between attempts; an attempt in flight
    /// always completes.
    pub async fn retry<T, E, F, Fut>(
        &self,
        label: &str,
        interrupt: &Interrupt,
        is_retryable: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        E: std::fmt::Display + From<Interrupted>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && self.allows_retry(attempts) => {
                    tracing::debug!(
                        label,
                        attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %e,
                        "retrying"
                    );
                    if let Err(interrupted) = interrupt.sleep(self.delay).await {
                        tracing::info!(label, attempts, "interrupted during backoff");
                        return Err(interrupted.into());
                    }
                }
                Err(e) => {
                    if attempts > 1 {
                        tracing::warn!(label, attempts, error = %e, "giving up");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
