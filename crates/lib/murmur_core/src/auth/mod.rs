//! Authentication logic.
//!
//! Password hashing, the credential store and signed session tokens. The
//! HTTP layer in `murmur_api` only wires these together.

pub mod credentials;
pub mod password;
pub mod token;

use thiserror::Error;

use crate::store::StoreError;

pub use credentials::CredentialStore;
pub use token::TokenManager;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token renewal failed: {0}")]
    RenewalError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
