//! Custody error taxonomy.
//!
//! Backend errors are translated here and nowhere else. Each variant says
//! whether the caller can fix it, retry it, or must escalate it.

use docvault_index::IndexError;
use docvault_store::StoreError;
use thiserror::Error;

/// Failure of a custody operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// Bad or missing input. Fix the request.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller is not allowed to act for the claimed owner.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No matching blob or record.
    #[error("not found: {0}")]
    NotFound(String),

    /// The blob store failed or timed out. Retryable.
    #[error("blob store unavailable during {operation}: {reason}")]
    StoreUnavailable {
        operation: &'static str,
        reason: String,
    },

    /// The metadata index failed or timed out. Retryable.
    #[error("metadata index unavailable during {operation}: {reason}")]
    IndexUnavailable {
        operation: &'static str,
        reason: String,
    },

    /// Fetched bytes do not match their address.
    #[error("content at {address} failed verification: {reason}")]
    Corrupt { address: String, reason: String },

    /// The index enforces uniqueness and the pair already exists.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl CustodyError {
    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::IndexUnavailable { .. }
        )
    }

    /// Translate a blob store error raised during `operation`.
    ///
    /// An address in a format the store does not use cannot name anything
    /// it holds, so it is reported as `NotFound`.
    pub fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { address } => Self::NotFound(format!("blob {address}")),
            StoreError::InvalidAddress(address) => {
                Self::NotFound(format!("blob {address} is not held by this store"))
            }
            StoreError::Corrupt { address, reason } => Self::Corrupt { address, reason },
            StoreError::Unavailable { reason } => Self::StoreUnavailable { operation, reason },
        }
    }
}

impl From<IndexError> for CustodyError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Unavailable { operation, reason } => {
                Self::IndexUnavailable { operation, reason }
            }
            conflict @ IndexError::Conflict { .. } => Self::Conflict(conflict.to_string()),
        }
    }
}

impl From<docvault_core::ValidationError> for CustodyError {
    fn from(err: docvault_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
