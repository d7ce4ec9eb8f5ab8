//! Blob store error types.

use thiserror::Error;

/// Errors reported by a [`ContentAddressStore`](crate::ContentAddressStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store has no blob at this address.
    #[error("blob not found: {address}")]
    NotFound { address: String },

    /// Bytes read back do not hash to the address they were stored under.
    #[error("integrity violation: blob {address}: {reason}")]
    Corrupt { address: String, reason: String },

    /// Transport failure, timeout, or backend-side error.
    #[error("blob store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The address is not in a format this backend understands.
    #[error("invalid content address for this store: {0}")]
    InvalidAddress(String),
}

impl StoreError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::unavailable(format!("I/O error: {err}"))
    }
}
