//! # Identity Newtypes
//!
//! [`OwnerId`] names the identity a document was uploaded on behalf of.
//! [`DocId`] is the caller-chosen logical identifier, unique only within
//! one owner's scope.
//!
//! ## Trust
//!
//! Constructing an `OwnerId` does not make it trusted. Only an owner id
//! produced by the identity gate may be used for the upload path; values
//! parsed from request parameters are advisory and must be cross-checked.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

const MAX_OWNER_ID_LEN: usize = 128;
const MAX_DOC_ID_LEN: usize = 256;

fn validate_identifier(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Identifier of the identity that owns a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the value is empty, longer than 128
    /// characters, or contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        validate_identifier("ownerId", value.into(), MAX_OWNER_ID_LEN).map(Self)
    }

    /// Allocate a fresh random owner id for a newly registered user.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Access the owner id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

/// Caller-supplied document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    /// Create a document id, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the value is empty, longer than 256
    /// characters, or contains control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        validate_identifier("docId", value.into(), MAX_DOC_ID_LEN).map(Self)
    }

    /// Access the document id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.0
    }
}
