//! Concurrent in-memory account store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::auth::{Identity, IdentityLookup};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl Account {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.username.clone())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("username '{0}' already exists")]
    UsernameTaken(String),

    #[error("account {0} not found")]
    NotFound(i64),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Accounts keyed by username, with sequential ids starting at 1.
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct AccountStore {
    by_username: Arc<DashMap<String, Account>>,
    last_id: Arc<AtomicI64>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account. Usernames are unique and case-sensitive.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Account, AccountError> {
        match self.by_username.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AccountError::UsernameTaken(username.to_string())),
            Entry::Vacant(slot) => {
                let account = Account {
                    id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                };
                slot.insert(account.clone());
                tracing::info!(user_id = account.id, username = %account.username, "Account registered");
                Ok(account)
            }
        }
    }

    pub fn find_by_username(&self, username: &str) -> Option<Account> {
        self.by_username.get(username).map(|r| r.value().clone())
    }

    pub fn find_by_id(&self, id: i64) -> Option<Account> {
        self.by_username
            .iter()
            .find(|r| r.value().id == id)
            .map(|r| r.value().clone())
    }

    /// Replace the email of account `id`.
    pub fn update_email(&self, id: i64, email: &str) -> Result<Account, AccountError> {
        let mut entry = self
            .by_username
            .iter_mut()
            .find(|r| r.value().id == id)
            .ok_or(AccountError::NotFound(id))?;
        entry.value_mut().email = email.to_string();
        Ok(entry.value().clone())
    }

    /// Delete the account named `username`, returning it if it existed.
    pub fn remove(&self, username: &str) -> Option<Account> {
        self.by_username.remove(username).map(|(_, account)| account)
    }

    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }
}

#[async_trait]
impl IdentityLookup for AccountStore {
    async fn find_by_subject(&self, subject: &str) -> Option<Identity> {
        self.find_by_username(subject).map(|account| account.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let store = AccountStore::new();
        let alice = store.register("alice", "a@example.com", "h".into()).unwrap();
        let bob = store.register("bob", "", "h".into()).unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = AccountStore::new();
        store.register("alice", "", "h".into()).unwrap();
        assert_eq!(
            store.register("alice", "other@example.com", "h".into()),
            Err(AccountError::UsernameTaken("alice".into()))
        );
        // Case-sensitive.
        assert!(store.register("Alice", "", "h".into()).is_ok());
    }

    #[test]
    fn test_lookup_and_update() {
        let store = AccountStore::new();
        let alice = store.register("alice", "old@example.com", "h".into()).unwrap();

        assert_eq!(store.find_by_id(alice.id), Some(alice.clone()));
        assert_eq!(store.find_by_id(99), None);

        let updated = store.update_email(alice.id, "new@example.com").unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(store.find_by_username("alice").unwrap().email, "new@example.com");
        assert_eq!(store.update_email(99, "x"), Err(AccountError::NotFound(99)));
    }

    #[tokio::test]
    async fn test_identity_lookup() {
        let store = AccountStore::new();
        let alice = store.register("alice", "", "h".into()).unwrap();

        assert_eq!(store.find_by_subject("alice").await, Some(Identity::new(alice.id, "alice")));
        store.remove("alice");
        assert_eq!(store.find_by_subject("alice").await, None);
    }

    #[tokio::test]
    async fn test_recreated_account_gets_new_id() {
        let store = AccountStore::new();
        let first = store.register("alice", "", "h".into()).unwrap();
        store.remove("alice");
        let second = store.register("alice", "", "h".into()).unwrap();
        assert_ne!(first.id, second.id);
    }
}
