// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Table readiness: check-or-create, then wait out the creating status

use super::StoreError;
use async_trait::async_trait;
use std::time::Duration;
use sz_core::Interrupt;

/// Delay between describe calls while a table is being created
pub const TABLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Status reported by a table describe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Missing,
    Creating,
    Active,
    /// Any other settled status (updating, deleting, archived, ...)
    Other(String),
}

/// Low-level table control implemented by each backend
#[async_trait]
pub trait TableControl: Send + Sync {
    async fn describe(&self) -> Result<TableStatus, StoreError>;

    /// Issue a create request. A concurrent create by someone else is success.
    async fn create(&self) -> Result<(), StoreError>;
}

/// Drive a table to the active status.
///
/// Missing tables are created once; a table that stays missing after the
/// create request is polled like a creating one. Polling stops when
/// `interrupt` fires.
pub async fn ensure_ready<T: TableControl + ?Sized>(
    table: &T,
    interval: Duration,
    interrupt: &Interrupt,
) -> Result<(), StoreError> {
    let mut create_requested = false;

    loop {
        match table.describe().await? {
            TableStatus::Active => return Ok(()),
            TableStatus::Missing if !create_requested => {
                tracing::info!("table missing, creating");
                table.create().await?;
                create_requested = true;
            }
            TableStatus::Missing | TableStatus::Creating => {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "table not ready");
                interrupt.sleep(interval).await?;
            }
            TableStatus::Other(status) => {
                tracing::error!(status, "table in unexpected status");
                return Err(StoreError::TableStatus(status));
            }
        }
    }
}
