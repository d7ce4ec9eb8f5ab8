//! # IPFS Blob Store
//!
//! Talks to an IPFS node through the Kubo RPC API. Addresses are CIDv1
//! strings chosen by the node; this client never derives them itself.
//!
//! | Operation | RPC |
//! |-----------|-----|
//! | `put` | `POST /api/v0/add?cid-version=1&pin=true` (multipart `file`) |
//! | `get` | `POST /api/v0/cat?arg={cid}` |
//! | `contains` | `POST /api/v0/block/stat?arg={cid}&offline=true` |
//! | `health` | `POST /api/v0/version` |
//!
//! ## Errors
//!
//! Kubo reports a missing block as HTTP 500 with a message containing
//! "not found". That is mapped to [`StoreError::NotFound`]; every other
//! non-success status, transport failure, or timeout maps to
//! [`StoreError::Unavailable`]. Retries are left to the caller.
//!
//! The node verifies blocks against their CIDs, so `get` performs no local
//! digest check.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use docvault_core::{BackendHealth, ContentAddress};
use serde::Deserialize;

use crate::error::StoreError;
use crate::ContentAddressStore;

/// Configuration for the IPFS backend.
#[derive(Debug, Clone)]
pub struct IpfsConfig {
    /// Base URL of the Kubo RPC API (e.g. `http://127.0.0.1:5001`).
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Only read blocks the node already holds instead of searching the
    /// network. Unknown CIDs then fail fast as `NotFound`.
    pub local_only: bool,
}

/// Kubo's default RPC listen address.
pub const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001";

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_IPFS_API_URL.to_string(),
            timeout_secs: 30,
            local_only: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct KuboError {
    #[serde(rename = "Message", default)]
    message: String,
}

/// A [`ContentAddressStore`] backed by an IPFS node.
#[derive(Debug, Clone)]
pub struct IpfsBlobStore {
    client: reqwest::Client,
    base_url: String,
    local_only: bool,
}

impl IpfsBlobStore {
    /// Build a client for the node described by `config`.
    pub fn new(config: IpfsConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::unavailable(format!("failed to build HTTP client: {e}")))?;
        let base_url = config.api_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            local_only: config.local_only,
        })
    }

    fn endpoint(&self, rpc: &str) -> String {
        format!("{}/api/v0/{rpc}", self.base_url)
    }

    /// Send a request, mapping transport failures and node errors.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
        address: Option<&ContentAddress>,
    ) -> Result<reqwest::Response, StoreError> {
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::unavailable(format!("ipfs {operation}: timed out"))
            } else {
                StoreError::unavailable(format!("ipfs {operation}: {e}"))
            }
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<KuboError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        if let Some(address) = address {
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("not found") || lowered.contains("no link named") {
                return Err(StoreError::NotFound {
                    address: address.to_string(),
                });
            }
        }

        Err(StoreError::unavailable(format!(
            "ipfs {operation}: HTTP {status}: {message}"
        )))
    }
}

/// CIDs are multibase strings: base32 (`b…`) or base58btc (`Qm…`).
fn validate_cid(address: &ContentAddress) -> Result<(), StoreError> {
    let s = address.as_str();
    if s.len() < 8 || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StoreError::InvalidAddress(s.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ContentAddressStore for IpfsBlobStore {
    #[tracing::instrument(skip(self, blob), fields(len = blob.len()))]
    async fn put(&self, blob: Bytes) -> Result<ContentAddress, StoreError> {
        let part = reqwest::multipart::Part::bytes(blob.to_vec()).file_name("blob");
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self
            .client
            .post(self.endpoint("add"))
            .query(&[("cid-version", "1"), ("pin", "true")])
            .multipart(form);

        let resp = self.send(request, "add", None).await?;
        let added: AddResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::unavailable(format!("ipfs add: bad response: {e}")))?;

        ContentAddress::new(added.hash)
            .map_err(|e| StoreError::unavailable(format!("ipfs add: node returned {e}")))
    }

    async fn get(&self, address: &ContentAddress) -> Result<Bytes, StoreError> {
        validate_cid(address)?;
        let mut query = vec![("arg", address.as_str())];
        if self.local_only {
            query.push(("offline", "true"));
        }
        let request = self.client.post(self.endpoint("cat")).query(&query);
        let resp = self.send(request, "cat", Some(address)).await?;
        resp.bytes()
            .await
            .map_err(|e| StoreError::unavailable(format!("ipfs cat: body read failed: {e}")))
    }

    async fn contains(&self, address: &ContentAddress) -> Result<bool, StoreError> {
        validate_cid(address)?;
        let request = self
            .client
            .post(self.endpoint("block/stat"))
            .query(&[("arg", address.as_str()), ("offline", "true")]);
        match self.send(request, "block/stat", Some(address)).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn health(&self) -> BackendHealth {
        let request = self.client.post(self.endpoint("version"));
        match self.send(request, "version", None).await {
            Ok(_) => BackendHealth::Healthy,
            Err(e) => BackendHealth::unavailable(e.to_string()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "ipfs"
    }

    fn verifies_content(&self) -> bool {
        false
    }
}
