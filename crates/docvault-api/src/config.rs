//! Service configuration.
//!
//! Everything comes from environment variables. Secrets are held in
//! `Zeroizing` buffers and redacted from `Debug` output.

use std::time::Duration;

use docvault_identity::{CredentialHasher, DEFAULT_TOKEN_TTL, MIN_SECRET_LEN};
use docvault_store::{BlobBackend, StoreConfig};
use zeroize::Zeroizing;

/// Default request body cap for uploads: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Runtime configuration for the API server.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Zeroizing<String>,
    pub token_ttl: Duration,
    /// bcrypt work factor for new password hashes.
    pub hash_cost: u32,
    pub max_upload_bytes: usize,
    pub store_timeout: Duration,
    pub index_timeout: Duration,
    pub verify_writes: bool,
    /// PostgreSQL URL. `None` keeps the index and user directory in memory.
    pub database_url: Option<Zeroizing<String>>,
    pub store: StoreConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("store_timeout", &self.store_timeout)
            .field("index_timeout", &self.index_timeout)
            .field("verify_writes", &self.verify_writes)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("store", &self.store)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `DOCVAULT_JWT_SECRET` (required, at least 32 bytes)
    /// - `DOCVAULT_TOKEN_TTL_SECS` (default: 3600)
    /// - `DOCVAULT_HASH_COST` (default: 10)
    /// - `DOCVAULT_MAX_UPLOAD_BYTES` (default: 52428800)
    /// - `DOCVAULT_STORE_TIMEOUT_SECS` (default: 30)
    /// - `DOCVAULT_INDEX_TIMEOUT_SECS` (default: 10)
    /// - `DOCVAULT_VERIFY_WRITES` (default: false)
    /// - `DATABASE_URL` (optional)
    /// - blob store variables, see [`StoreConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("DOCVAULT_JWT_SECRET")
            .map(Zeroizing::new)
            .map_err(|_| ConfigError::MissingSecret)?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                len: jwt_secret.len(),
            });
        }

        Ok(Self {
            port: env_parse("PORT", 8080)?,
            jwt_secret,
            token_ttl: Duration::from_secs(env_parse(
                "DOCVAULT_TOKEN_TTL_SECS",
                DEFAULT_TOKEN_TTL.as_secs(),
            )?),
            hash_cost: env_parse("DOCVAULT_HASH_COST", CredentialHasher::DEFAULT_COST)?,
            max_upload_bytes: env_parse("DOCVAULT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            store_timeout: Duration::from_secs(env_parse("DOCVAULT_STORE_TIMEOUT_SECS", 30)?),
            index_timeout: Duration::from_secs(env_parse("DOCVAULT_INDEX_TIMEOUT_SECS", 10)?),
            verify_writes: env_parse("DOCVAULT_VERIFY_WRITES", false)?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(Zeroizing::new),
            store: StoreConfig::from_env()?,
        })
    }

    /// Fully in-memory configuration for tests and local experiments.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            port: 0,
            jwt_secret: Zeroizing::new(jwt_secret.to_string()),
            token_ttl: DEFAULT_TOKEN_TTL,
            hash_cost: CredentialHasher::MIN_COST,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            store_timeout: Duration::from_secs(5),
            index_timeout: Duration::from_secs(5),
            verify_writes: false,
            database_url: None,
            store: StoreConfig {
                backend: BlobBackend::Memory,
                ..StoreConfig::default()
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: var.to_string(),
                value: raw,
            })
        }
        _ => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DOCVAULT_JWT_SECRET environment variable is required")]
    MissingSecret,
    #[error("DOCVAULT_JWT_SECRET must be at least {MIN_SECRET_LEN} bytes, got {len}")]
    WeakSecret { len: usize },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
    #[error(transparent)]
    Store(#[from] docvault_store::ConfigError),
}
