//! The account boundary: registration, login, and bearer tokens.
//!
//! Not part of the pipeline core. The HTTP surface that fronts this gate
//! is an external collaborator; this module owns the contract it
//! presents — unique usernames, salted one-way password hashes, and
//! self-contained signed credentials.

mod password;
mod store;
mod token;

pub use password::PasswordHash;
pub use store::{Account, AccountProfile, InMemoryUserStore, UserStore};
pub use token::{AccessToken, TokenClaims, TokenSigner, DEFAULT_TOKEN_TTL_SECS};

use crate::errors::AccountError;
use std::sync::Arc;

/// Issues and validates credentials against the user store.
#[derive(Debug, Clone)]
pub struct AccountGate {
    store: Arc<dyn UserStore>,
    signer: TokenSigner,
}

impl AccountGate {
    /// Creates a gate over a store and token signer.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// Registers a new account, returning its public fields.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateUsername` if the username is
    /// already registered.
    pub fn register(&self, username: &str, password: &str) -> Result<AccountProfile, AccountError> {
        let account = Account::new(username, password);
        let profile = account.profile();
        self.store.insert(account)?;
        tracing::info!(username, "account registered");
        Ok(profile)
    }

    /// Authenticates a username/password pair, returning a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for an absent username
    /// or a wrong password; callers cannot distinguish the two.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AccessToken, AccountError> {
        let verified = self
            .store
            .get(username)
            .is_some_and(|account| account.verify_password(password));
        if !verified {
            tracing::info!(username, "login rejected");
            return Err(AccountError::InvalidCredentials);
        }
        Ok(self.signer.issue(username))
    }

    /// Verifies a bearer token, returning its claims. Needs no store
    /// lookup.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for a malformed,
    /// tampered, or expired token.
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, AccountError> {
        self.signer.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AccountGate {
        AccountGate::new(
            Arc::new(InMemoryUserStore::new()),
            TokenSigner::new(b"test-key".to_vec()),
        )
    }

    #[test]
    fn test_register_then_login() {
        let gate = gate();
        let profile = gate.register("alice", "hunter2").unwrap();
        assert_eq!(profile.username, "alice");

        let token = gate.authenticate("alice", "hunter2").unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = gate.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_second_registration_fails() {
        let gate = gate();
        gate.register("alice", "hunter2").unwrap();

        assert_eq!(
            gate.register("alice", "other").unwrap_err(),
            AccountError::DuplicateUsername
        );
    }

    #[test]
    fn test_wrong_password_rejected() {
        let gate = gate();
        gate.register("alice", "hunter2").unwrap();

        assert_eq!(
            gate.authenticate("alice", "wrong").unwrap_err(),
            AccountError::InvalidCredentials
        );
    }

    #[test]
    fn test_unknown_user_indistinguishable_from_wrong_password() {
        let gate = gate();
        gate.register("alice", "hunter2").unwrap();

        let absent = gate.authenticate("nobody", "hunter2").unwrap_err();
        let wrong = gate.authenticate("alice", "wrong").unwrap_err();
        assert_eq!(absent, wrong);
    }
}
