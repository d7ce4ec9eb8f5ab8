//! User accounts and the directory they live in.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use docvault_core::{BackendHealth, OwnerId, Timestamp};
use parking_lot::RwLock;

use crate::error::IdentityError;

/// A registered account.
///
/// Custom `Debug` redacts the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user_id: OwnerId,
    /// Normalized (trimmed, lowercased) email.
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Persistent store of user accounts keyed by email.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Store a new account. Fails with [`IdentityError::DuplicateEmail`] if
    /// the email is taken.
    async fn insert(&self, account: UserAccount) -> Result<UserAccount, IdentityError>;

    /// Look up an account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, IdentityError>;

    /// Probe the backend.
    async fn health(&self) -> BackendHealth;
}

/// A [`UserDirectory`] held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    accounts: Arc<RwLock<HashMap<String, UserAccount>>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn insert(&self, account: UserAccount) -> Result<UserAccount, IdentityError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.email) {
            return Err(IdentityError::DuplicateEmail);
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, IdentityError> {
        Ok(self.accounts.read().get(email).cloned())
    }

    async fn health(&self) -> BackendHealth {
        BackendHealth::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str) -> UserAccount {
        UserAccount {
            user_id: OwnerId::generate(),
            email: email.to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQ".to_string(),
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_find() {
        let dir = MemoryUserDirectory::new();
        let stored = dir.insert(account("a@b.c")).await.unwrap();
        let found = dir.find_by_email("a@b.c").await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert!(dir.find_by_email("x@y.z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let dir = MemoryUserDirectory::new();
        dir.insert(account("a@b.c")).await.unwrap();
        assert_eq!(
            dir.insert(account("a@b.c")).await.unwrap_err(),
            IdentityError::DuplicateEmail
        );
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn debug_hides_hash() {
        let dbg = format!("{:?}", account("a@b.c"));
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("$2b$"));
    }
}
