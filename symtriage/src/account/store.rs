//! User storage behind a trait seam.

use super::password::PasswordHash;
use crate::errors::AccountError;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

/// A registered account: unique username plus a salted one-way password
/// hash. Created on registration, read on login; no update or delete.
#[derive(Debug, Clone)]
pub struct Account {
    /// The unique username.
    pub username: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    password: PasswordHash,
}

impl Account {
    /// Creates an account, hashing the password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            created_at: Utc::now(),
            password: PasswordHash::derive(password),
        }
    }

    /// Verifies a candidate password against the stored hash.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }

    /// Returns the account's public fields.
    #[must_use]
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

/// The public view of an account, safe to return to callers.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    /// The username.
    pub username: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Storage for registered accounts.
///
/// The persistence engine is out of scope; implementations only need
/// uniqueness on insert and lookup by username.
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateUsername` if the username exists.
    fn insert(&self, account: Account) -> Result<(), AccountError>;

    /// Looks up an account by username.
    fn get(&self, username: &str) -> Option<Account>;
}

/// An in-memory store, safe for concurrent registration and login.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, account: Account) -> Result<(), AccountError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.username) {
            return Err(AccountError::DuplicateUsername);
        }
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    fn get(&self, username: &str) -> Option<Account> {
        self.accounts.read().get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let store = InMemoryUserStore::new();
        store.insert(Account::new("alice", "hunter2")).unwrap();

        let account = store.get("alice").unwrap();
        assert_eq!(account.username, "alice");
        assert!(account.verify_password("hunter2"));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(Account::new("alice", "first")).unwrap();

        let err = store.insert(Account::new("alice", "second")).unwrap_err();
        assert_eq!(err, AccountError::DuplicateUsername);

        // Original account is untouched.
        assert!(store.get("alice").unwrap().verify_password("first"));
    }

    #[test]
    fn test_missing_user() {
        let store = InMemoryUserStore::new();
        assert!(store.get("nobody").is_none());
    }

    #[test]
    fn test_account_debug_does_not_leak_password() {
        let account = Account::new("alice", "hunter2");
        let rendered = format!("{account:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
