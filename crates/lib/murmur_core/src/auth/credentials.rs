//! Credential store.
//!
//! Login ids map to bcrypt hashes (`{loginId}:HASH`), each hash maps to its
//! owning account id (`{hash}`), and accounts live in a hash-map keyed by id.

use std::sync::Arc;

use tracing::debug;

use super::AuthError;
use crate::models::Account;
use crate::store::{KvStore, StoreError, keys};

/// Leaf operations over credentials and account profiles.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KvStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Store the password hash for `login_id`.
    ///
    /// Fails with [`StoreError::Rejected`] when the login id already has one.
    pub async fn put_credential(&self, login_id: &str, hash: &str) -> Result<(), AuthError> {
        let key = keys::password_hash(login_id);
        if !self.kv.set_nx(&key, hash).await? {
            return Err(StoreError::Rejected(format!("credential exists for {login_id}")).into());
        }
        Ok(())
    }

    /// Whether `login_id` already has a stored hash.
    pub async fn credential_exists(&self, login_id: &str) -> Result<bool, AuthError> {
        Ok(self.kv.exists(&keys::password_hash(login_id)).await?)
    }

    /// Remove the credential and its owner index. Used to undo a signup
    /// that failed part way.
    pub async fn remove_credential(&self, login_id: &str, hash: &str) -> Result<(), AuthError> {
        self.kv.del(&keys::password_hash(login_id)).await?;
        self.kv.del(&keys::hash_owner(hash)).await?;
        debug!(login_id, "credential removed");
        Ok(())
    }

    pub async fn put_hash_index(&self, hash: &str, account_id: &str) -> Result<(), AuthError> {
        self.kv.set(&keys::hash_owner(hash), account_id).await?;
        Ok(())
    }

    pub async fn get_hash(&self, login_id: &str) -> Result<String, AuthError> {
        self.kv
            .get(&keys::password_hash(login_id))
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("credential for {login_id}")))
    }

    pub async fn get_account_id(&self, hash: &str) -> Result<String, AuthError> {
        self.kv
            .get(&keys::hash_owner(hash))
            .await?
            .ok_or_else(|| AuthError::NotFound("account for credential".into()))
    }

    /// Field-level upsert of an account profile.
    pub async fn put_account(&self, account: &Account) -> Result<(), AuthError> {
        if account.id.is_empty() {
            return Err(AuthError::InvalidInput("account id is empty".into()));
        }
        self.kv
            .hset(&keys::account(&account.id), &account.to_fields())
            .await?;
        Ok(())
    }

    pub async fn get_account(&self, account_id: &str) -> Result<Account, AuthError> {
        if account_id.is_empty() {
            return Err(AuthError::NotFound("account with empty id".into()));
        }
        let fields = self.kv.hgetall(&keys::account(account_id)).await?;
        if fields.is_empty() {
            return Err(AuthError::NotFound(format!("account {account_id}")));
        }
        Ok(Account::from_fields(&fields))
    }
}
