//! User account persistence.
//!
//! Operates on the `users` table. `email` carries a unique constraint, so
//! concurrent registrations of the same address resolve to exactly one
//! winner and a [`IdentityError::DuplicateEmail`] for the rest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docvault_core::{BackendHealth, OwnerId, Timestamp};
use sqlx::PgPool;

use crate::directory::{UserAccount, UserDirectory};
use crate::error::IdentityError;

const UNIQUE_VIOLATION: &str = "23505";

/// A [`UserDirectory`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn insert(&self, account: UserAccount) -> Result<UserAccount, IdentityError> {
        let result = sqlx::query(
            "INSERT INTO users (user_id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(account.user_id.as_str())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(*account.created_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(IdentityError::DuplicateEmail)
            }
            Err(e) => Err(IdentityError::DirectoryUnavailable(e.to_string())),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::DirectoryUnavailable(e.to_string()))?;

        row.map(UserRow::into_account).transpose()
    }

    async fn health(&self) -> BackendHealth {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => BackendHealth::Healthy,
            Err(e) => BackendHealth::unavailable(e.to_string()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_account(self) -> Result<UserAccount, IdentityError> {
        let user_id = OwnerId::new(self.user_id).map_err(|e| {
            IdentityError::DirectoryUnavailable(format!("malformed user row: {e}"))
        })?;
        Ok(UserAccount {
            user_id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Timestamp::from_datetime(self.created_at),
        })
    }
}
