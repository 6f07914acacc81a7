//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor for stored credentials.
pub const BCRYPT_COST: u32 = 14;

/// Hash a password with bcrypt at `cost`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// A wrong password is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(format!("bcrypt verify: {e}")))
}
