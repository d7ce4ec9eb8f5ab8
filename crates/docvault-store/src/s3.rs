//! # S3 Blob Store
//!
//! Object-storage backend for S3 and S3-compatible servers (MinIO). Keys
//! are derived from content as `blobs/{sha256hex}`, so the address is still
//! a digest and reads are verified locally.
//!
//! The bucket is created on connect. "Already owned by you" and "already
//! exists" answers count as success so several instances can start against
//! the same bucket.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use docvault_core::{sha256_digest, BackendHealth, ContentAddress, ContentDigest};

use crate::config::S3Settings;
use crate::error::StoreError;
use crate::{digest_of, verify_digest, ContentAddressStore};

const KEY_PREFIX: &str = "blobs";

/// A [`ContentAddressStore`] backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    /// Load AWS configuration from the environment, build a client, and
    /// make sure the bucket exists.
    pub async fn connect(settings: S3Settings) -> Result<Self, StoreError> {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let store = Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: settings.bucket,
        };
        store.ensure_bucket().await?;
        Ok(store)
    }

    async fn ensure_bucket(&self) -> Result<(), StoreError> {
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "created blob bucket");
                Ok(())
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    tracing::debug!(bucket = %self.bucket, "blob bucket already present");
                    Ok(())
                } else {
                    Err(StoreError::unavailable(format!(
                        "create bucket {}: {}",
                        self.bucket,
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }

    fn key_for(digest: &ContentDigest) -> String {
        format!("{KEY_PREFIX}/{}", digest.to_hex())
    }
}

#[async_trait]
impl ContentAddressStore for S3BlobStore {
    #[tracing::instrument(skip(self, blob), fields(bucket = %self.bucket, len = blob.len()))]
    async fn put(&self, blob: Bytes) -> Result<ContentAddress, StoreError> {
        let digest = sha256_digest(&blob);
        let len = i64::try_from(blob.len())
            .map_err(|_| StoreError::unavailable("blob larger than i64::MAX bytes"))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::key_for(&digest))
            .content_length(len)
            .body(ByteStream::from(blob))
            .send()
            .await
            .map_err(|e| {
                StoreError::unavailable(format!("s3 put_object: {}", DisplayErrorContext(&e)))
            })?;
        Ok(ContentAddress::from_digest(&digest))
    }

    async fn get(&self, address: &ContentAddress) -> Result<Bytes, StoreError> {
        let digest = digest_of(address)?;
        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::key_for(&digest))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(StoreError::NotFound {
                        address: address.to_string(),
                    });
                }
                return Err(StoreError::unavailable(format!(
                    "s3 get_object: {}",
                    DisplayErrorContext(&service_err)
                )));
            }
        };

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::unavailable(format!("s3 body read failed: {e}")))?
            .into_bytes();
        verify_digest(address, &digest, &bytes)?;
        Ok(bytes)
    }

    async fn contains(&self, address: &ContentAddress) -> Result<bool, StoreError> {
        let digest = digest_of(address)?;
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(Self::key_for(&digest))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StoreError::unavailable(format!(
                        "s3 head_object: {}",
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }

    async fn health(&self) -> BackendHealth {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => BackendHealth::Healthy,
            Err(e) => BackendHealth::unavailable(format!(
                "bucket {}: {}",
                self.bucket,
                DisplayErrorContext(&e)
            )),
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    fn verifies_content(&self) -> bool {
        true
    }
}
