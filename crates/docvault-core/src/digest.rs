//! # Content Digests
//!
//! [`ContentDigest`] carries an algorithm tag next to the raw 32 bytes so
//! stores can pick the right hash function when verifying a blob read back
//! from disk or object storage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// The hash algorithm that produced a [`ContentDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Wrap raw SHA-256 output.
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            bytes,
        }
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a SHA-256 digest from 64 hex characters (either case).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDigest`] if the input is not exactly
    /// 64 hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(ValidationError::InvalidDigest(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidDigest(
                "digest contains non-hex characters".into(),
            ));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(chunk[0]);
            let lo = hex_value(chunk[1]);
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self::sha256(bytes))
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

// Caller guarantees `b` is an ASCII hex digit.
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Compute the SHA-256 digest of a byte slice.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let out = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    ContentDigest::sha256(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_hello_matches_known_vector() {
        let digest = sha256_digest(b"hello");
        assert_eq!(
            digest.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn hex_parse_accepts_uppercase() {
        let digest = sha256_digest(b"abc");
        let upper = digest.to_hex().to_uppercase();
        assert_eq!(ContentDigest::from_hex(&upper).unwrap(), digest);
    }

    #[test]
    fn hex_parse_rejects_wrong_length() {
        assert!(ContentDigest::from_hex("abc123").is_err());
    }

    #[test]
    fn hex_parse_rejects_non_hex() {
        let bad = "g".repeat(64);
        let err = ContentDigest::from_hex(&bad).unwrap_err();
        assert!(err.to_string().contains("non-hex characters"));
    }

    #[test]
    fn display_carries_algorithm_prefix() {
        let digest = sha256_digest(b"");
        assert!(digest.to_string().starts_with("sha256:"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
                let digest = sha256_digest(&data);
                prop_assert_eq!(ContentDigest::from_hex(&digest.to_hex()).unwrap(), digest);
            }
        }
    }
}
