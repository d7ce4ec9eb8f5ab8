//! # docvault-store: Content-Addressed Blob Storage
//!
//! Defines [`ContentAddressStore`], the narrow interface the custody service
//! writes blobs through, and the backends that implement it.
//!
//! | Backend | Address | Verifies on read |
//! |---------|---------|------------------|
//! | [`MemoryBlobStore`] | SHA-256 hex | yes |
//! | [`FsBlobStore`] | SHA-256 hex | yes |
//! | [`IpfsBlobStore`] | CIDv1 | no (the node does) |
//! | `S3BlobStore` (feature `s3`) | SHA-256 hex | yes |
//!
//! ## Determinism
//!
//! `put` of identical bytes always yields the same address on a given
//! backend, and re-storing content that is already present is a no-op.
//! That makes a whole-upload retry safe after an index failure.
//!
//! ## Sharing
//!
//! Stores are constructed once at startup and shared across requests behind
//! `Arc<dyn ContentAddressStore>`. Every implementation is safe for
//! concurrent use.

pub mod config;
pub mod error;
pub mod fs;
pub mod ipfs;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{sha256_digest, BackendHealth, ContentAddress, ContentDigest};
use subtle::ConstantTimeEq;

pub use config::{BlobBackend, ConfigError, S3Settings, StoreConfig};
pub use error::StoreError;
pub use fs::FsBlobStore;
pub use ipfs::{IpfsBlobStore, IpfsConfig};
pub use memory::MemoryBlobStore;
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;

/// Durable, content-addressed blob storage.
#[async_trait]
pub trait ContentAddressStore: Send + Sync {
    /// Store a blob and return its address.
    async fn put(&self, blob: Bytes) -> Result<ContentAddress, StoreError>;

    /// Fetch the blob stored at `address`.
    ///
    /// Backends that derive addresses from content recompute the digest and
    /// return [`StoreError::Corrupt`] on mismatch.
    async fn get(&self, address: &ContentAddress) -> Result<Bytes, StoreError>;

    /// Whether a blob exists at `address`.
    async fn contains(&self, address: &ContentAddress) -> Result<bool, StoreError>;

    /// Probe the backend.
    async fn health(&self) -> BackendHealth;

    /// Short backend label for logs and readiness output.
    fn backend_name(&self) -> &'static str;

    /// Whether `get` checks fetched bytes against the address.
    fn verifies_content(&self) -> bool;
}

/// Stores that can enumerate what they hold.
///
/// Used by the orphan audit to find blobs no record references.
#[async_trait]
pub trait BlobInventory: Send + Sync {
    /// Every address currently stored, sorted.
    async fn list_addresses(&self) -> Result<Vec<ContentAddress>, StoreError>;
}

/// Build the store selected by `config`.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn ContentAddressStore>, StoreError> {
    let store: Arc<dyn ContentAddressStore> = match config.backend {
        BlobBackend::Memory => Arc::new(MemoryBlobStore::new()),
        BlobBackend::Fs => Arc::new(FsBlobStore::open(&config.blob_dir).await?),
        BlobBackend::Ipfs => Arc::new(IpfsBlobStore::new(config.ipfs.clone())?),
        #[cfg(feature = "s3")]
        BlobBackend::S3 => Arc::new(S3BlobStore::connect(config.s3.clone()).await?),
        #[cfg(not(feature = "s3"))]
        BlobBackend::S3 => {
            return Err(StoreError::unavailable(
                "s3 backend requested but docvault-store was built without the `s3` feature",
            ))
        }
    };
    tracing::info!(backend = store.backend_name(), "blob store ready");
    Ok(store)
}

/// Parse a digest-derived address, mapping failure to [`StoreError::InvalidAddress`].
pub(crate) fn digest_of(address: &ContentAddress) -> Result<ContentDigest, StoreError> {
    address
        .as_digest()
        .ok_or_else(|| StoreError::InvalidAddress(address.to_string()))
}

/// Recompute the SHA-256 of `bytes` and compare it to `expected` in constant time.
pub(crate) fn verify_digest(
    address: &ContentAddress,
    expected: &ContentDigest,
    bytes: &[u8],
) -> Result<(), StoreError> {
    let recomputed = sha256_digest(bytes);
    if !bool::from(recomputed.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(StoreError::Corrupt {
            address: address.to_string(),
            reason: format!("stored bytes hash to {}", recomputed.to_hex()),
        });
    }
    Ok(())
}
