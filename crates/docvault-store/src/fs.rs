//! # Filesystem Blob Store
//!
//! Blobs live at `{root}/{hex[0..2]}/{hex}` where `hex` is the SHA-256
//! digest of the content. The two-character fan-out keeps directories small.
//!
//! ## Write Path
//!
//! Bytes are written to a uniquely named temp file in the target directory
//! and renamed into place. A concurrent writer of the same content renames
//! an identical file over the same path, so the final state is correct
//! either way. A blob that already exists is not rewritten.
//!
//! ## Integrity
//!
//! On read the digest is recomputed and compared with the file name in
//! constant time. A mismatch is reported as [`StoreError::Corrupt`], never
//! silently returned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{sha256_digest, BackendHealth, ContentAddress, ContentDigest};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::{digest_of, verify_digest, BlobInventory, ContentAddressStore};

/// A [`ContentAddressStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::unavailable(format!(
                "cannot create blob directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of the blob with this digest.
    pub fn blob_path(&self, digest: &ContentDigest) -> PathBuf {
        let hex = digest.to_hex();
        self.root.join(&hex[..2]).join(hex)
    }

    async fn write_new(&self, path: &Path, blob: &[u8]) -> Result<(), StoreError> {
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::unavailable("blob path has no parent directory"))?;
        tokio::fs::create_dir_all(dir).await?;

        let tmp = dir.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp)
                .await?;
            file.write_all(blob).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ContentAddressStore for FsBlobStore {
    #[tracing::instrument(skip(self, blob), fields(len = blob.len()))]
    async fn put(&self, blob: Bytes) -> Result<ContentAddress, StoreError> {
        let digest = sha256_digest(&blob);
        let path = self.blob_path(&digest);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(address = %digest.to_hex(), "blob already present");
        } else {
            self.write_new(&path, &blob).await?;
            tracing::debug!(address = %digest.to_hex(), "blob written");
        }

        Ok(ContentAddress::from_digest(&digest))
    }

    async fn get(&self, address: &ContentAddress) -> Result<Bytes, StoreError> {
        let digest = digest_of(address)?;
        let path = self.blob_path(&digest);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    address: address.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        verify_digest(address, &digest, &bytes)?;
        Ok(Bytes::from(bytes))
    }

    async fn contains(&self, address: &ContentAddress) -> Result<bool, StoreError> {
        let digest = digest_of(address)?;
        Ok(tokio::fs::try_exists(self.blob_path(&digest)).await?)
    }

    async fn health(&self) -> BackendHealth {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => BackendHealth::Healthy,
            Ok(_) => BackendHealth::unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )),
            Err(e) => BackendHealth::unavailable(format!("{}: {e}", self.root.display())),
        }
    }

    fn backend_name(&self) -> &'static str {
        "fs"
    }

    fn verifies_content(&self) -> bool {
        true
    }
}

#[async_trait]
impl BlobInventory for FsBlobStore {
    async fn list_addresses(&self) -> Result<Vec<ContentAddress>, StoreError> {
        let mut addresses = Vec::new();
        let mut shards = tokio::fs::read_dir(&self.root).await?;
        while let Some(shard) = shards.next_entry().await? {
            if !shard.file_type().await?.is_dir() {
                continue;
            }
            let mut entries = tokio::fs::read_dir(shard.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                // Skips temp files and anything else that is not a digest.
                if let Ok(digest) = ContentDigest::from_hex(name) {
                    if digest.to_hex() == name {
                        addresses.push(ContentAddress::from_digest(&digest));
                    }
                }
            }
        }
        addresses.sort();
        Ok(addresses)
    }
}
