//! In-memory blob store.
//!
//! Addresses are SHA-256 hex digests. Used by tests and by single-process
//! development deployments; contents do not survive a restart.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use docvault_core::{sha256_digest, BackendHealth, ContentAddress};

use crate::error::StoreError;
use crate::{digest_of, verify_digest, BlobInventory, ContentAddressStore};

/// A [`ContentAddressStore`] backed by a concurrent hash map.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Overwrite the bytes behind `address` without updating the address.
    #[cfg(test)]
    pub(crate) fn tamper(&self, address: &ContentAddress, bytes: &'static [u8]) {
        self.blobs
            .insert(address.as_str().to_string(), Bytes::from_static(bytes));
    }
}

#[async_trait]
impl ContentAddressStore for MemoryBlobStore {
    async fn put(&self, blob: Bytes) -> Result<ContentAddress, StoreError> {
        let address = ContentAddress::from_digest(&sha256_digest(&blob));
        self.blobs
            .entry(address.as_str().to_string())
            .or_insert(blob);
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Bytes, StoreError> {
        let digest = digest_of(address)?;
        let bytes = self
            .blobs
            .get(&digest.to_hex())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                address: address.to_string(),
            })?;
        verify_digest(address, &digest, &bytes)?;
        Ok(bytes)
    }

    async fn contains(&self, address: &ContentAddress) -> Result<bool, StoreError> {
        let digest = digest_of(address)?;
        Ok(self.blobs.contains_key(&digest.to_hex()))
    }

    async fn health(&self) -> BackendHealth {
        BackendHealth::Healthy
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn verifies_content(&self) -> bool {
        true
    }
}

#[async_trait]
impl BlobInventory for MemoryBlobStore {
    async fn list_addresses(&self) -> Result<Vec<ContentAddress>, StoreError> {
        let mut addresses: Vec<ContentAddress> = self
            .blobs
            .iter()
            .filter_map(|entry| ContentAddress::new(entry.key().clone()).ok())
            .collect();
        addresses.sort();
        Ok(addresses)
    }
}
