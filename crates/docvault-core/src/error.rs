//! # Validation Errors
//!
//! Errors raised when constructing domain primitives from untrusted input.
//! Built with `thiserror`; every variant names the field that failed.

use thiserror::Error;

/// A domain primitive rejected its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace only.
    #[error("{field} must not be empty")]
    EmptyField {
        /// The field that was empty.
        field: &'static str,
    },

    /// A field exceeded its maximum length.
    #[error("{field} too long: {len} chars (max {max})")]
    TooLong {
        /// The field that was too long.
        field: &'static str,
        /// Actual length in characters.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// A field contained characters outside its permitted set.
    #[error("{field} contains invalid characters: {value:?}")]
    InvalidCharacters {
        /// The field that was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A digest string was not 64 lowercase hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// A content address could not be parsed.
    #[error("invalid content address: {0:?}")]
    InvalidAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::EmptyField { field: "docId" };
        assert_eq!(err.to_string(), "docId must not be empty");
    }

    #[test]
    fn too_long_reports_lengths() {
        let err = ValidationError::TooLong {
            field: "ownerId",
            len: 300,
            max: 128,
        };
        let msg = err.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains("128"));
    }

    #[test]
    fn invalid_address_quotes_value() {
        let err = ValidationError::InvalidAddress("a b".to_string());
        assert!(err.to_string().contains("\"a b\""));
    }
}
