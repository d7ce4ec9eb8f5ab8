//! Identity boundary errors.

use thiserror::Error;

/// Errors raised while registering, authenticating, or authorizing callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Unknown email or wrong password. The two are deliberately not
    /// distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed, expired, or not signed by us.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// Registration input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The user directory backend could not be reached.
    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The token could not be signed.
    #[error("token issuance failed: {0}")]
    TokenIssue(String),

    /// The blocking hash task failed to complete.
    #[error("credential hashing failed: {0}")]
    Hashing(String),
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Hashing(err.to_string())
    }
}
