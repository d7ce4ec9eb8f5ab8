//! # IdentityGate
//!
//! The only path from a bearer credential to a trusted [`OwnerId`].
//!
//! Password hashing and verification are CPU-bound, so both run on the
//! blocking pool and are awaited before any decision is made.

use std::sync::Arc;

use docvault_core::{BackendHealth, OwnerId, Timestamp};

use crate::directory::{UserAccount, UserDirectory};
use crate::error::IdentityError;
use crate::hasher::CredentialHasher;
use crate::token::{IssuedToken, TokenIssuer};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

const MAX_EMAIL_LEN: usize = 254;

/// Registers accounts, exchanges credentials for tokens, and resolves
/// bearer tokens to owners.
#[derive(Clone)]
pub struct IdentityGate {
    directory: Arc<dyn UserDirectory>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl IdentityGate {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: CredentialHasher,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            directory,
            hasher,
            tokens,
        }
    }

    /// Create an account. The password hash is computed and stored before
    /// this returns.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<UserAccount, IdentityError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let hasher = self.hasher;
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let account = UserAccount {
            user_id: OwnerId::generate(),
            email,
            password_hash,
            created_at: Timestamp::now(),
        };
        let account = self.directory.insert(account).await?;
        tracing::info!(user_id = %account.user_id, "account registered");
        Ok(account)
    }

    /// Exchange email and password for a signed access token.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedToken, IdentityError> {
        let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let Some(account) = self.directory.find_by_email(&email).await? else {
            tracing::info!("login rejected");
            return Err(IdentityError::InvalidCredentials);
        };

        let hasher = self.hasher;
        let password = password.to_owned();
        let stored = account.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await?;
        if !matches {
            tracing::info!("login rejected");
            return Err(IdentityError::InvalidCredentials);
        }

        self.tokens.issue(&account.user_id, &account.email)
    }

    /// Resolve an `Authorization` header value to the owner it names.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<OwnerId, IdentityError> {
        let header = authorization
            .ok_or_else(|| IdentityError::Unauthorized("missing authorization header".into()))?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            IdentityError::Unauthorized("authorization header must use Bearer scheme".into())
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::Unauthorized("empty bearer token".into()));
        }

        let claims = self.tokens.verify(token)?;
        OwnerId::new(claims.sub)
            .map_err(|e| IdentityError::Unauthorized(format!("token subject invalid: {e}")))
    }

    /// Probe the user directory.
    pub async fn health(&self) -> BackendHealth {
        self.directory.health().await
    }
}

fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !valid || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(IdentityError::Validation(format!(
            "invalid email address: {email:?}"
        )));
    }
    Ok(email)
}
