//! # PostgreSQL Metadata Index
//!
//! All functions operate on the `documents` table. Records are immutable
//! once inserted, so there are no update or delete statements.
//!
//! `seq` is a `BIGSERIAL` assigned at insert time; ordering by it gives
//! commit order, which is the native order every finder returns.
//!
//! The schema is created by the API service's migrations. A unique index on
//! `(owner_id, doc_id)` is optional; when an operator adds one, duplicate
//! commits surface as [`IndexError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docvault_core::{
    BackendHealth, ContentAddress, DocId, DocumentRecord, OwnerId, Timestamp, ValidationError,
};
use sqlx::PgPool;

use crate::error::IndexError;
use crate::MetadataIndex;

const UNIQUE_VIOLATION: &str = "23505";

const SELECT_COLUMNS: &str =
    "SELECT owner_id, doc_id, name, content_type, created_at, content_address FROM documents";

/// A [`MetadataIndex`] backed by PostgreSQL via SQLx.
#[derive(Debug, Clone)]
pub struct PgIndex {
    pool: PgPool,
}

impl PgIndex {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch(
        &self,
        operation: &'static str,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, DocumentRow, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<DocumentRecord>, IndexError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| IndexError::unavailable(operation, e.to_string()))?;
        Ok(records_from_rows(operation, rows))
    }
}

/// Convert fetched rows, skipping any that no longer validate so one bad row
/// cannot hide the rest of an owner's documents.
fn records_from_rows(operation: &'static str, rows: Vec<DocumentRow>) -> Vec<DocumentRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let (owner_id, doc_id) = (row.owner_id.clone(), row.doc_id.clone());
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        operation,
                        %owner_id,
                        %doc_id,
                        error = %e,
                        "skipping malformed document row"
                    );
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl MetadataIndex for PgIndex {
    #[tracing::instrument(skip(self, record), fields(owner_id = %record.owner_id, doc_id = %record.doc_id))]
    async fn commit(&self, record: DocumentRecord) -> Result<DocumentRecord, IndexError> {
        let result = sqlx::query(
            "INSERT INTO documents (owner_id, doc_id, name, content_type, created_at, content_address)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.owner_id.as_str())
        .bind(record.doc_id.as_str())
        .bind(&record.name)
        .bind(&record.content_type)
        .bind(*record.created_at.as_datetime())
        .bind(record.content_address.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(IndexError::Conflict {
                    owner_id: record.owner_id.to_string(),
                    doc_id: record.doc_id.to_string(),
                })
            }
            Err(e) => Err(IndexError::unavailable("commit", e.to_string())),
        }
    }

    async fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<DocumentRecord>, IndexError> {
        let sql = format!("{SELECT_COLUMNS} WHERE owner_id = $1 ORDER BY seq");
        let query = sqlx::query_as::<_, DocumentRow>(&sql).bind(owner_id.as_str());
        self.fetch("find_by_owner", query).await
    }

    async fn find_by_doc_id(
        &self,
        owner_id: &OwnerId,
        doc_id: &DocId,
    ) -> Result<Vec<DocumentRecord>, IndexError> {
        let sql = format!("{SELECT_COLUMNS} WHERE owner_id = $1 AND doc_id = $2 ORDER BY seq");
        let query = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(owner_id.as_str())
            .bind(doc_id.as_str());
        self.fetch("find_by_doc_id", query).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<DocumentRecord>, IndexError> {
        let sql = format!("{SELECT_COLUMNS} WHERE name = $1 ORDER BY seq");
        let query = sqlx::query_as::<_, DocumentRow>(&sql).bind(name);
        self.fetch("find_by_name", query).await
    }

    async fn all_content_addresses(&self) -> Result<Vec<ContentAddress>, IndexError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT content_address FROM documents ORDER BY content_address",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| IndexError::unavailable("all_content_addresses", e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(address,)| match ContentAddress::new(address) {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed content address");
                    None
                }
            })
            .collect())
    }

    async fn health(&self) -> BackendHealth {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => BackendHealth::Healthy,
            Err(e) => BackendHealth::unavailable(e.to_string()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Internal row type for SQLx deserialization.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    owner_id: String,
    doc_id: String,
    name: String,
    content_type: String,
    created_at: DateTime<Utc>,
    content_address: String,
}

impl DocumentRow {
    fn into_record(self) -> Result<DocumentRecord, ValidationError> {
        Ok(DocumentRecord {
            owner_id: OwnerId::new(self.owner_id)?,
            doc_id: DocId::new(self.doc_id)?,
            name: self.name,
            content_type: self.content_type,
            created_at: Timestamp::from_datetime(self.created_at),
            content_address: ContentAddress::new(self.content_address)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(address: &str) -> DocumentRow {
        DocumentRow {
            owner_id: "u1".into(),
            doc_id: "d1".into(),
            name: "greeting.txt".into(),
            content_type: "text/plain".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            content_address: address.into(),
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = row("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
            .into_record()
            .unwrap();
        assert_eq!(record.owner_id.as_str(), "u1");
        assert_eq!(record.doc_id.as_str(), "d1");
        assert_eq!(record.created_at.to_string(), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn row_with_empty_address_is_rejected() {
        assert!(matches!(
            row("").into_record(),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let good = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        let mut overlong_owner = row(good);
        overlong_owner.owner_id = "u".repeat(10_000);
        let mut second = row(good);
        second.doc_id = "d2".into();

        let records = records_from_rows(
            "find_by_owner",
            vec![row(good), overlong_owner, row(""), second],
        );
        let doc_ids: Vec<&str> = records.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(doc_ids, ["d1", "d2"]);
    }

    #[test]
    fn select_columns_match_row_fields() {
        for column in [
            "owner_id",
            "doc_id",
            "name",
            "content_type",
            "created_at",
            "content_address",
        ] {
            assert!(SELECT_COLUMNS.contains(column));
        }
    }
}
