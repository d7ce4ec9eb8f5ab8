//! # Startup Wiring
//!
//! Builds the blob store, metadata index, and user directory selected by
//! [`AppConfig`] and assembles them into an [`AppState`].
//!
//! With a database pool the index and user directory live in PostgreSQL.
//! Without one both are in memory and a warning is logged: records and
//! accounts will not survive a restart, even if blobs do.

use std::sync::Arc;

use docvault_custody::{CustodyConfig, DocumentCustodyService};
use docvault_identity::{
    CredentialHasher, IdentityError, IdentityGate, MemoryUserDirectory, PgUserDirectory,
    TokenIssuer, UserDirectory,
};
use docvault_index::{MemoryIndex, MetadataIndex, PgIndex};
use docvault_store::{ContentAddressStore, MemoryBlobStore, StoreError};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::state::AppState;

/// Errors during startup wiring.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("blob store: {0}")]
    Store(#[from] StoreError),

    #[error("identity: {0}")]
    Identity(#[from] IdentityError),
}

/// Wire backends from configuration.
pub async fn bootstrap(config: AppConfig, pool: Option<PgPool>) -> Result<AppState, BootstrapError> {
    let store = docvault_store::build_store(&config.store).await?;

    let (index, directory): (Arc<dyn MetadataIndex>, Arc<dyn UserDirectory>) = match pool {
        Some(pool) => (
            Arc::new(PgIndex::new(pool.clone())),
            Arc::new(PgUserDirectory::new(pool)),
        ),
        None => {
            tracing::warn!(
                "DATABASE_URL not set: document index and accounts are in memory and will not survive restarts"
            );
            (
                Arc::new(MemoryIndex::new()),
                Arc::new(MemoryUserDirectory::new()),
            )
        }
    };
    tracing::info!(backend = index.backend_name(), "metadata index ready");

    assemble(config, store, index, directory)
}

/// Wire a fully in-memory state. Used by tests and local experiments.
pub fn in_memory(config: AppConfig) -> Result<AppState, BootstrapError> {
    assemble(
        config,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(MemoryIndex::new()),
        Arc::new(MemoryUserDirectory::new()),
    )
}

/// Wire explicit backends.
pub fn assemble(
    config: AppConfig,
    store: Arc<dyn ContentAddressStore>,
    index: Arc<dyn MetadataIndex>,
    directory: Arc<dyn UserDirectory>,
) -> Result<AppState, BootstrapError> {
    let custody = DocumentCustodyService::new(
        store,
        index,
        CustodyConfig {
            store_timeout: config.store_timeout,
            index_timeout: config.index_timeout,
            verify_writes: config.verify_writes,
        },
    );
    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes().to_vec(), config.token_ttl)?;
    let identity = IdentityGate::new(
        directory,
        CredentialHasher::new(config.hash_cost),
        tokens,
    );
    Ok(AppState::new(config, custody, identity))
}
