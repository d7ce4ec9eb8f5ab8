//! # Credential Hashing
//!
//! bcrypt over the password. Stored hashes use the modular crypt format
//! (`$2b$<cost>$<salt+hash>`), so the cost travels with each hash and
//! raising the default only affects newly registered accounts.

use crate::error::IdentityError;

/// Produces and checks stored credential hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl CredentialHasher {
    /// Work factor used for new hashes unless configured otherwise.
    pub const DEFAULT_COST: u32 = 10;
    /// Lowest work factor bcrypt accepts.
    pub const MIN_COST: u32 = 4;
    /// Highest work factor bcrypt accepts.
    pub const MAX_COST: u32 = 31;

    /// Create a hasher with the given work factor, clamped to bcrypt's range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(Self::MIN_COST, Self::MAX_COST),
        }
    }

    /// Work factor applied to new hashes.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, IdentityError> {
        bcrypt::hash(password, self.cost).map_err(|e| IdentityError::Hashing(e.to_string()))
    }

    /// Check `password` against a stored hash.
    ///
    /// A stored value bcrypt cannot parse never matches.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match bcrypt::verify(password, stored) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored credential hash is malformed");
                false
            }
        }
    }
}
