//! # DocumentCustodyService
//!
//! ## Upload
//!
//! ```text
//! validate ─▶ store.put ─▶ [store.get + compare] ─▶ index.commit ─▶ record
//! ```
//!
//! The steps are strictly sequential: the record embeds the address `put`
//! returned, so nothing is committed until the blob is durable. A failed
//! `put` aborts with no metadata written.
//!
//! If `commit` fails after a successful `put`, the blob stays in the store
//! unreferenced (an orphan). It is logged at `warn` with its address and
//! counted in `docvault_orphan_blobs_total`, and the index error goes back
//! to the caller. The blob is never deleted here. Retrying the whole upload
//! is safe because `put` is idempotent for identical bytes.
//!
//! ## Timeouts
//!
//! Every backend call is bounded by [`CustodyConfig`]. An expired bound is
//! reported as `StoreUnavailable` or `IndexUnavailable` naming the call.
//! Nothing is retried internally.
//!
//! ## Consistency
//!
//! A resolve issued right after an upload sees that upload only if the
//! index is read-your-writes consistent. Check
//! [`DocumentCustodyService::reads_may_lag_commits`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docvault_core::{
    BackendHealth, ContentAddress, DocumentQuery, DocumentRecord, OwnerId, Timestamp,
};
use docvault_index::{IndexError, MetadataIndex};
use docvault_store::{ContentAddressStore, StoreError};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::CustodyConfig;
use crate::error::CustodyError;
use crate::request::UploadRequest;

/// Readiness of both backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyHealth {
    pub store_backend: &'static str,
    pub store: BackendHealth,
    pub index_backend: &'static str,
    pub index: BackendHealth,
}

impl CustodyHealth {
    /// True when both backends answered.
    pub fn is_ready(&self) -> bool {
        self.store.is_healthy() && self.index.is_healthy()
    }
}

/// Orchestrates blob storage and metadata indexing.
///
/// Cheap to clone; clones share the same backends.
#[derive(Clone)]
pub struct DocumentCustodyService {
    store: Arc<dyn ContentAddressStore>,
    index: Arc<dyn MetadataIndex>,
    config: CustodyConfig,
}

impl std::fmt::Debug for DocumentCustodyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCustodyService")
            .field("store", &self.store.backend_name())
            .field("index", &self.index.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

impl DocumentCustodyService {
    pub fn new(
        store: Arc<dyn ContentAddressStore>,
        index: Arc<dyn MetadataIndex>,
        config: CustodyConfig,
    ) -> Self {
        Self {
            store,
            index,
            config,
        }
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    /// Whether a resolve may miss an upload that already returned.
    pub fn reads_may_lag_commits(&self) -> bool {
        self.index.is_eventually_consistent()
    }

    /// Store the blob, then commit its record.
    #[tracing::instrument(
        skip(self, request),
        fields(
            owner_id = %request.owner_id(),
            doc_id = %request.doc_id(),
            len = request.blob().len(),
            address = tracing::field::Empty,
        )
    )]
    pub async fn upload(&self, request: UploadRequest) -> Result<DocumentRecord, CustodyError> {
        let blob = request.blob().clone();

        let address = match self.store_call("put", self.store.put(blob.clone())).await {
            Ok(address) => address,
            Err(err) => {
                count_upload("store_failed");
                tracing::warn!(error = %err, "blob write failed, nothing committed");
                return Err(err);
            }
        };
        tracing::Span::current().record("address", tracing::field::display(&address));

        if self.config.verify_writes {
            if let Err(err) = self.verify_write(&address, &blob).await {
                count_upload("verify_failed");
                tracing::error!(error = %err, "write verification failed, nothing committed");
                return Err(err);
            }
        }

        let record = DocumentRecord {
            owner_id: request.owner_id().clone(),
            doc_id: request.doc_id().clone(),
            name: request.name().to_string(),
            content_type: request.content_type().to_string(),
            created_at: Timestamp::now(),
            content_address: address.clone(),
        };

        match self.index_call("commit", self.index.commit(record)).await {
            Ok(committed) => {
                count_upload("committed");
                tracing::info!("document committed");
                Ok(committed)
            }
            Err(err) => {
                count_upload("index_failed");
                metrics::counter!("docvault_orphan_blobs_total").increment(1);
                tracing::warn!(
                    %address,
                    error = %err,
                    "blob stored but record not committed; blob is orphaned"
                );
                Err(err)
            }
        }
    }

    /// Records matching `query`, in the index's native order. No match is
    /// an empty `Vec`.
    #[tracing::instrument(skip(self), fields(query = %query))]
    pub async fn resolve(&self, query: &DocumentQuery) -> Result<Vec<DocumentRecord>, CustodyError> {
        self.index_call(query.operation(), self.index.find(query))
            .await
    }

    /// Run several queries concurrently. Results are in input order.
    pub async fn resolve_many(
        &self,
        queries: Vec<DocumentQuery>,
    ) -> Vec<Result<Vec<DocumentRecord>, CustodyError>> {
        let mut slots: Vec<Option<Result<Vec<DocumentRecord>, CustodyError>>> =
            (0..queries.len()).map(|_| None).collect();

        let mut tasks = JoinSet::new();
        for (position, query) in queries.into_iter().enumerate() {
            let service = self.clone();
            tasks.spawn(async move { (position, service.resolve(&query).await) });
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => slots[position] = Some(result),
                Err(e) => tracing::error!(error = %e, "resolve task failed"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(CustodyError::IndexUnavailable {
                        operation: "resolve_many",
                        reason: "query task did not complete".into(),
                    })
                })
            })
            .collect()
    }

    /// Fetch the blob at `address`.
    #[tracing::instrument(skip(self), fields(address = %address))]
    pub async fn fetch_blob(&self, address: &ContentAddress) -> Result<Bytes, CustodyError> {
        self.store_call("get", self.store.get(address)).await
    }

    /// The first record for `owner_id` that has a content address, with its
    /// bytes.
    ///
    /// "First" is the index's native order. Owners with several documents
    /// should download by address instead.
    pub async fn fetch_first_for_owner(
        &self,
        owner_id: &OwnerId,
    ) -> Result<(DocumentRecord, Bytes), CustodyError> {
        let records = self
            .resolve(&DocumentQuery::by_owner(owner_id.clone()))
            .await?;
        let record = records
            .into_iter()
            .find(DocumentRecord::has_content)
            .ok_or_else(|| {
                CustodyError::NotFound(format!("no stored document for owner {owner_id}"))
            })?;
        let bytes = self.fetch_blob(&record.content_address).await?;
        Ok((record, bytes))
    }

    /// Probe both backends concurrently.
    pub async fn health(&self) -> CustodyHealth {
        let (store, index) = tokio::join!(self.store.health(), self.index.health());
        CustodyHealth {
            store_backend: self.store.backend_name(),
            store,
            index_backend: self.index.backend_name(),
            index,
        }
    }

    async fn verify_write(&self, address: &ContentAddress, expected: &Bytes) -> Result<(), CustodyError> {
        let stored = self.store_call("verify", self.store.get(address)).await?;
        if stored != *expected {
            return Err(CustodyError::Corrupt {
                address: address.to_string(),
                reason: format!(
                    "read-back returned {} bytes that differ from the {} uploaded",
                    stored.len(),
                    expected.len()
                ),
            });
        }
        Ok(())
    }

    async fn store_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CustodyError> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result.map_err(|e| CustodyError::from_store(operation, e)),
            Err(_) => Err(CustodyError::StoreUnavailable {
                operation,
                reason: timed_out(self.config.store_timeout),
            }),
        }
    }

    async fn index_call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, IndexError>>,
    ) -> Result<T, CustodyError> {
        match tokio::time::timeout(self.config.index_timeout, call).await {
            Ok(result) => result.map_err(CustodyError::from),
            Err(_) => Err(CustodyError::IndexUnavailable {
                operation,
                reason: timed_out(self.config.index_timeout),
            }),
        }
    }
}

fn count_upload(outcome: &'static str) {
    metrics::counter!("docvault_uploads_total", "outcome" => outcome).increment(1);
}

fn timed_out(limit: Duration) -> String {
    format!("timed out after {}ms", limit.as_millis())
}
