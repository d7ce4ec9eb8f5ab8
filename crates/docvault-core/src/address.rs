//! # Content Addresses
//!
//! A [`ContentAddress`] is the retrieval key a blob store hands back from
//! `put`. Its format belongs to the store: local stores use the SHA-256 hex
//! digest, the IPFS store uses a CID. The core only guarantees it is a
//! non-empty token safe to embed in URLs and file names.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::ValidationError;

const MAX_ADDRESS_LEN: usize = 512;

/// Opaque, store-defined identifier for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Parse a content address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if the value is empty,
    /// too long, or contains whitespace, path separators, quotes, or
    /// control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let valid = !s.is_empty()
            && s.len() <= MAX_ADDRESS_LEN
            && !s
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '"'));
        if !valid {
            return Err(ValidationError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Address a blob by its SHA-256 digest (lowercase hex).
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_hex())
    }

    /// Interpret this address as a SHA-256 hex digest, if it is one.
    pub fn as_digest(&self) -> Option<ContentDigest> {
        ContentDigest::from_hex(&self.0).ok()
    }

    /// Access the address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentAddress> for String {
    fn from(address: ContentAddress) -> Self {
        address.0
    }
}
