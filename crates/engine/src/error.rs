// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the serializer

use sz_adapters::{ProcessError, StoreError};
use thiserror::Error;

/// Errors that abort a serialize run
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("process error: {0}")]
    Process(#[from] ProcessError),
    /// The job ran but the project could not be returned to idle
    #[error("failed to release project {project}: {source}")]
    Release {
        project: String,
        #[source]
        source: StoreError,
    },
}
