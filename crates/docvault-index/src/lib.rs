//! # docvault-index: Document Metadata Index
//!
//! Stores committed [`DocumentRecord`]s and answers the three lookups the
//! custody service needs: by owner, by `(owner, doc id)`, and by name.
//!
//! ## Query Contract
//!
//! Finds never fail on "no match"; they return an empty `Vec`. The only
//! failure is backend unavailability, reported with the operation name so
//! callers can decide whether to retry. Results come back in the backend's
//! native order, which for both shipped backends is commit order.
//!
//! ## Uniqueness
//!
//! `(owner_id, doc_id)` is not unique by default. Committing the same pair
//! twice yields two records and both are returned. A backend may opt into
//! enforcement, in which case a duplicate commit fails with
//! [`IndexError::Conflict`].
//!
//! ## Consistency
//!
//! [`MetadataIndex::is_eventually_consistent`] tells callers whether a read
//! immediately after a commit may miss that commit. Both shipped backends
//! are read-your-writes consistent; a ledger-backed index would not be.

pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use docvault_core::{BackendHealth, ContentAddress, DocId, DocumentQuery, DocumentRecord, OwnerId};

pub use error::IndexError;
pub use memory::MemoryIndex;
pub use postgres::PgIndex;

/// Queryable store of committed document records.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Persist a record exactly as given and return it.
    async fn commit(&self, record: DocumentRecord) -> Result<DocumentRecord, IndexError>;

    /// Every record committed by `owner_id`.
    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<DocumentRecord>, IndexError>;

    /// Records committed by `owner_id` under `doc_id`.
    async fn find_by_doc_id(
        &self,
        owner_id: &OwnerId,
        doc_id: &DocId,
    ) -> Result<Vec<DocumentRecord>, IndexError>;

    /// Records whose name equals `name`, across all owners.
    async fn find_by_name(&self, name: &str) -> Result<Vec<DocumentRecord>, IndexError>;

    /// Dispatch a [`DocumentQuery`] to the matching finder.
    async fn find(&self, query: &DocumentQuery) -> Result<Vec<DocumentRecord>, IndexError> {
        match query {
            DocumentQuery::ByOwner { owner_id } => self.find_by_owner(owner_id).await,
            DocumentQuery::ByDocId { owner_id, doc_id } => {
                self.find_by_doc_id(owner_id, doc_id).await
            }
            DocumentQuery::ByName { name } => self.find_by_name(name).await,
        }
    }

    /// Distinct content addresses referenced by any record.
    async fn all_content_addresses(&self) -> Result<Vec<ContentAddress>, IndexError>;

    /// Probe the backend.
    async fn health(&self) -> BackendHealth;

    /// Short backend label for logs and readiness output.
    fn backend_name(&self) -> &'static str;

    /// Whether a read may not observe a commit that already returned.
    fn is_eventually_consistent(&self) -> bool {
        false
    }
}
