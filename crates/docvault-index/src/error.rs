//! Metadata index error types.

use thiserror::Error;

/// Errors reported by a [`MetadataIndex`](crate::MetadataIndex).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The backend could not be reached or returned an error.
    #[error("metadata index unavailable during {operation}: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },

    /// Uniqueness is enforced and this `(owner, doc id)` pair already exists.
    #[error("document {doc_id:?} already committed for owner {owner_id:?}")]
    Conflict { owner_id: String, doc_id: String },
}

impl IndexError {
    pub(crate) fn unavailable(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_names_operation() {
        let err = IndexError::unavailable("find_by_owner", "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("find_by_owner"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn conflict_quotes_keys() {
        let err = IndexError::Conflict {
            owner_id: "u1".into(),
            doc_id: "d1".into(),
        };
        assert_eq!(
            err.to_string(),
            "document \"d1\" already committed for owner \"u1\""
        );
    }
}
