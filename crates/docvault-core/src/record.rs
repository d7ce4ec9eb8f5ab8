//! # Document Records and Queries
//!
//! A [`DocumentRecord`] binds an owner and a document id to the content
//! address of a blob that is already durably stored. Records are created
//! once and never mutated or deleted.
//!
//! `(owner_id, doc_id)` is expected to be unique but is not enforced here:
//! duplicate commits yield several records and every query returns all of
//! them in the index's native order.

use serde::{Deserialize, Serialize};

use crate::address::ContentAddress;
use crate::identity::{DocId, OwnerId};
use crate::temporal::Timestamp;

/// Immutable metadata for one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Identity that uploaded the document, as established by the identity gate.
    pub owner_id: OwnerId,
    /// Caller-supplied document identifier, unique only within `owner_id`.
    pub doc_id: DocId,
    /// Display name, defaults to the uploaded file's original name.
    pub name: String,
    /// MIME type of the blob.
    pub content_type: String,
    /// Server-side commit time.
    pub created_at: Timestamp,
    /// Address returned by the blob store for this document's bytes.
    pub content_address: ContentAddress,
}

impl DocumentRecord {
    /// Whether this record points at a blob.
    pub fn has_content(&self) -> bool {
        !self.content_address.as_str().is_empty()
    }
}

/// The three lookup keys the metadata index serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "camelCase")]
pub enum DocumentQuery {
    /// Every record committed by one owner.
    ByOwner {
        /// The owner to match.
        owner_id: OwnerId,
    },
    /// Records for one `(owner, doc id)` pair.
    ByDocId {
        /// The owner to match.
        owner_id: OwnerId,
        /// The document id to match.
        doc_id: DocId,
    },
    /// Records whose display name equals the query string, across all owners.
    ByName {
        /// The exact name to match.
        name: String,
    },
}

impl DocumentQuery {
    /// Query by owner.
    pub fn by_owner(owner_id: OwnerId) -> Self {
        Self::ByOwner { owner_id }
    }

    /// Query by owner and document id.
    pub fn by_doc_id(owner_id: OwnerId, doc_id: DocId) -> Self {
        Self::ByDocId { owner_id, doc_id }
    }

    /// Query by display name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::ByName { name: name.into() }
    }

    /// Stable operation label used in errors, logs, and metrics.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::ByOwner { .. } => "find_by_owner",
            Self::ByDocId { .. } => "find_by_doc_id",
            Self::ByName { .. } => "find_by_name",
        }
    }

    /// Whether a record satisfies this query.
    pub fn matches(&self, record: &DocumentRecord) -> bool {
        match self {
            Self::ByOwner { owner_id } => &record.owner_id == owner_id,
            Self::ByDocId { owner_id, doc_id } => {
                &record.owner_id == owner_id && &record.doc_id == doc_id
            }
            Self::ByName { name } => &record.name == name,
        }
    }
}

impl std::fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByOwner { owner_id } => write!(f, "byOwner({owner_id})"),
            Self::ByDocId { owner_id, doc_id } => write!(f, "byDocId({owner_id}, {doc_id})"),
            Self::ByName { name } => write!(f, "byName({name:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_digest;

    fn record(owner: &str, doc: &str, name: &str) -> DocumentRecord {
        DocumentRecord {
            owner_id: OwnerId::new(owner).unwrap(),
            doc_id: DocId::new(doc).unwrap(),
            name: name.to_string(),
            content_type: "text/plain".to_string(),
            created_at: Timestamp::now(),
            content_address: ContentAddress::from_digest(&sha256_digest(b"hello")),
        }
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(record("u1", "d1", "greeting.txt")).unwrap();
        for key in [
            "ownerId",
            "docId",
            "name",
            "contentType",
            "createdAt",
            "contentAddress",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn by_doc_id_requires_both_keys() {
        let q = DocumentQuery::by_doc_id(OwnerId::new("u1").unwrap(), DocId::new("d1").unwrap());
        assert!(q.matches(&record("u1", "d1", "a")));
        assert!(!q.matches(&record("u2", "d1", "a")));
        assert!(!q.matches(&record("u1", "d2", "a")));
    }

    #[test]
    fn by_name_ignores_owner() {
        let q = DocumentQuery::by_name("report.pdf");
        assert!(q.matches(&record("u1", "d1", "report.pdf")));
        assert!(q.matches(&record("u2", "d9", "report.pdf")));
        assert!(!q.matches(&record("u1", "d1", "Report.pdf")));
    }

    #[test]
    fn operation_labels_are_stable() {
        assert_eq!(
            DocumentQuery::by_owner(OwnerId::new("u1").unwrap()).operation(),
            "find_by_owner"
        );
        assert_eq!(DocumentQuery::by_name("x").operation(), "find_by_name");
    }
}
