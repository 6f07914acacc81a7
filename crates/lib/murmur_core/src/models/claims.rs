//! Session claims carried inside the signed token.

use serde::{Deserialize, Serialize};

use super::account::Account;

/// Signed session payload.
///
/// Field names match the cookie payloads issued by earlier deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Login identifier (email).
    pub username: String,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    /// Account snapshot at issuance.
    pub user: Account,
    /// Expiry (unix timestamp).
    #[serde(default)]
    pub exp: i64,
    /// Issued at (unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Unique per issuance, so two tokens signed in the same second differ.
    #[serde(default)]
    pub jti: String,
}

impl SessionClaims {
    /// Fresh, unsigned claims for `account`.
    pub fn new(username: impl Into<String>, account: Account) -> Self {
        Self {
            username: username.into(),
            is_logged_in: false,
            user: account,
            exp: 0,
            iat: 0,
            jti: String::new(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.user.id
    }
}
