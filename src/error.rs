// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Input rejected at the API boundary. Nothing was written.
    #[error("malformed {field}: {reason}")]
    MalformedInput {
        field: &'static str,
        reason: String,
    },

    /// The backing store could not complete a read or write.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Snapshot bytes failed structural or checksum validation.
    #[error("snapshot corrupted: {0}")]
    CorruptSnapshot(&'static str),

    /// Event log bytes could not be decoded or do not line up with a snapshot.
    #[error("event log corrupted: {0}")]
    CorruptEventLog(String),

    /// Ledger tables disagree with each other.
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(&'static str),
}

impl KernelError {
    pub fn wrong_width(field: &'static str, expected: usize, found: usize) -> Self {
        KernelError::MalformedInput {
            field,
            reason: format!("expected {} bytes, found {}", expected, found),
        }
    }

    pub fn storage<E: core::fmt::Display>(err: E) -> Self {
        KernelError::StorageUnavailable(err.to_string())
    }
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
pub type Result<T> = KernelResult<T>;
