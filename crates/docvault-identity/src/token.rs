//! # Access Tokens
//!
//! HS256-signed JWTs carrying the owner id as `sub`. Verification checks
//! signature, expiry, and issuer; anything else is rejected as
//! [`IdentityError::Unauthorized`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use docvault_core::{OwnerId, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::IdentityError;

/// `iss` claim stamped on and required of every token.
pub const ISSUER: &str = "docvault";

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// A freshly signed token and what it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub owner_id: OwnerId,
    pub expires_at: Timestamp,
}

/// Signs and verifies access tokens with a shared secret.
///
/// Custom `Debug` redacts the secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer. The secret must be at least [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, IdentityError> {
        let secret = Zeroizing::new(secret.into());
        if secret.len() < MIN_SECRET_LEN {
            return Err(IdentityError::TokenIssue(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self { secret, ttl })
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `owner_id`, valid from now for the configured TTL.
    pub fn issue(&self, owner_id: &OwnerId, email: &str) -> Result<IssuedToken, IdentityError> {
        self.issue_at(owner_id, email, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        owner_id: &OwnerId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IdentityError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| IdentityError::TokenIssue(format!("token ttl out of range: {e}")))?;
        let expires = now + ttl;
        let claims = Claims {
            sub: owner_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            iss: ISSUER.to_string(),
        };
        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| IdentityError::TokenIssue(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            owner_id: owner_id.clone(),
            expires_at: Timestamp::from_datetime(expires),
        })
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::Unauthorized(format!("invalid access token: {e}")))
    }
}
