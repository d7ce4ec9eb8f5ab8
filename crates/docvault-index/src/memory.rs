//! In-memory metadata index.
//!
//! Records are kept in a `Vec` in commit order behind a `parking_lot`
//! read-write lock. Every query is a linear scan, which is fine for tests
//! and single-node development.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use docvault_core::{BackendHealth, ContentAddress, DocId, DocumentQuery, DocumentRecord, OwnerId};
use parking_lot::RwLock;

use crate::error::IndexError;
use crate::MetadataIndex;

/// A [`MetadataIndex`] held in process memory.
///
/// Cloning shares the underlying records.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    records: Arc<RwLock<Vec<DocumentRecord>>>,
    unique_doc_ids: bool,
}

impl MemoryIndex {
    /// Create an empty index that accepts duplicate `(owner, doc id)` commits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index that rejects duplicate `(owner, doc id)` commits.
    pub fn with_unique_doc_ids() -> Self {
        Self {
            unique_doc_ids: true,
            ..Self::default()
        }
    }

    /// Number of committed records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn select(&self, query: &DocumentQuery) -> Vec<DocumentRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MetadataIndex for MemoryIndex {
    async fn commit(&self, record: DocumentRecord) -> Result<DocumentRecord, IndexError> {
        let mut records = self.records.write();
        if self.unique_doc_ids
            && records
                .iter()
                .any(|r| r.owner_id == record.owner_id && r.doc_id == record.doc_id)
        {
            return Err(IndexError::Conflict {
                owner_id: record.owner_id.to_string(),
                doc_id: record.doc_id.to_string(),
            });
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<DocumentRecord>, IndexError> {
        Ok(self.select(&DocumentQuery::by_owner(owner_id.clone())))
    }

    async fn find_by_doc_id(
        &self,
        owner_id: &OwnerId,
        doc_id: &DocId,
    ) -> Result<Vec<DocumentRecord>, IndexError> {
        Ok(self.select(&DocumentQuery::by_doc_id(owner_id.clone(), doc_id.clone())))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<DocumentRecord>, IndexError> {
        Ok(self.select(&DocumentQuery::by_name(name)))
    }

    async fn all_content_addresses(&self) -> Result<Vec<ContentAddress>, IndexError> {
        let set: BTreeSet<ContentAddress> = self
            .records
            .read()
            .iter()
            .map(|r| r.content_address.clone())
            .collect();
        Ok(set.into_iter().collect())
    }

    async fn health(&self) -> BackendHealth {
        BackendHealth::Healthy
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::{sha256_digest, Timestamp};

    fn record(owner: &str, doc: &str, name: &str, content: &[u8]) -> DocumentRecord {
        DocumentRecord {
            owner_id: OwnerId::new(owner).unwrap(),
            doc_id: DocId::new(doc).unwrap(),
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
            created_at: Timestamp::now(),
            content_address: ContentAddress::from_digest(&sha256_digest(content)),
        }
    }

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    #[tokio::test]
    async fn commit_returns_record_unchanged() {
        let index = MemoryIndex::new();
        let r = record("u1", "d1", "a.pdf", b"a");
        assert_eq!(index.commit(r.clone()).await.unwrap(), r);
    }

    #[tokio::test]
    async fn find_by_owner_returns_only_that_owner_in_commit_order() {
        let index = MemoryIndex::new();
        let first = record("u1", "d1", "a.pdf", b"a");
        let other = record("u2", "d1", "a.pdf", b"a");
        let second = record("u1", "d2", "b.pdf", b"b");
        for r in [&first, &other, &second] {
            index.commit(r.clone()).await.unwrap();
        }

        let found = index.find_by_owner(&owner("u1")).await.unwrap();
        assert_eq!(found, vec![first, second]);
    }

    #[tokio::test]
    async fn duplicate_doc_ids_are_all_returned() {
        let index = MemoryIndex::new();
        index.commit(record("u1", "d1", "v1.pdf", b"1")).await.unwrap();
        index.commit(record("u1", "d1", "v2.pdf", b"2")).await.unwrap();

        let found = index
            .find_by_doc_id(&owner("u1"), &DocId::new("d1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "v1.pdf");
        assert_eq!(found[1].name, "v2.pdf");
    }

    #[tokio::test]
    async fn unique_mode_rejects_duplicate_pair() {
        let index = MemoryIndex::with_unique_doc_ids();
        index.commit(record("u1", "d1", "a", b"1")).await.unwrap();
        let err = index.commit(record("u1", "d1", "b", b"2")).await.unwrap_err();
        assert!(matches!(err, IndexError::Conflict { .. }));
        // Same doc id under another owner is fine.
        index.commit(record("u2", "d1", "c", b"3")).await.unwrap();
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn missing_matches_are_empty_not_errors() {
        let index = MemoryIndex::new();
        assert!(index.find_by_name("nonexistent.pdf").await.unwrap().is_empty());
        assert!(index
            .find_by_doc_id(&owner("u1"), &DocId::new("d1").unwrap())
            .await
            .unwrap()
            .is_empty());
        assert!(index.find_by_owner(&owner("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_dispatches_on_query() {
        let index = MemoryIndex::new();
        index.commit(record("u1", "d1", "shared.txt", b"x")).await.unwrap();
        index.commit(record("u2", "d7", "shared.txt", b"y")).await.unwrap();

        let by_name = index.find(&DocumentQuery::by_name("shared.txt")).await.unwrap();
        assert_eq!(by_name.len(), 2);
        let by_owner = index
            .find(&DocumentQuery::by_owner(owner("u2")))
            .await
            .unwrap();
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].doc_id.as_str(), "d7");
    }

    #[tokio::test]
    async fn content_addresses_are_deduplicated() {
        let index = MemoryIndex::new();
        index.commit(record("u1", "d1", "a", b"same")).await.unwrap();
        index.commit(record("u1", "d2", "b", b"same")).await.unwrap();
        index.commit(record("u1", "d3", "c", b"other")).await.unwrap();
        assert_eq!(index.all_content_addresses().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clones_share_records() {
        let index = MemoryIndex::new();
        let clone = index.clone();
        clone.commit(record("u1", "d1", "a", b"a")).await.unwrap();
        assert_eq!(index.len(), 1);
        assert!(!index.is_eventually_consistent());
    }
}
