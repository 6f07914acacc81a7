//! Session token issuance, verification and renewal.
//!
//! Tokens are HS256 JWTs carrying [`SessionClaims`]. Every successful
//! renewal writes the new token into the account record, and the
//! authentication middleware only accepts a token equal to the stored one,
//! so each account has a single live token at any time.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::AuthError;
use super::credentials::CredentialStore;
use crate::models::{Account, SessionClaims, generate_id};

/// Session token lifetime: 1 hour.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Signs and checks session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::seconds(TOKEN_TTL_SECS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime, also used as the cookie max-age.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `claims`, stamping `iat` and an absolute `exp`.
    pub fn issue(&self, claims: &mut SessionClaims) -> Result<String, AuthError> {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + self.ttl).timestamp();
        claims.jti = generate_id();
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::RenewalError(format!("jwt encode: {e}")))
    }

    /// Check signature, structure and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Re-sign `claims` with a fresh expiry and persist the new token as the
    /// account's only live token.
    pub async fn renew(
        &self,
        credentials: &CredentialStore,
        mut claims: SessionClaims,
    ) -> Result<(String, SessionClaims), AuthError> {
        claims.user.token = None;
        let token = self.issue(&mut claims)?;

        let update = Account {
            token: Some(token.clone()),
            ..Account::with_id(claims.account_id())
        };
        credentials
            .put_account(&update)
            .await
            .map_err(|e| AuthError::RenewalError(format!("persist token: {e}")))?;

        debug!(account_id = %claims.account_id(), exp = claims.exp, "session renewed");
        claims.user.token = Some(token.clone());
        Ok((token, claims))
    }

    /// Invalidate whatever token is stored for `account_id`.
    pub async fn revoke(
        &self,
        credentials: &CredentialStore,
        account_id: &str,
    ) -> Result<(), AuthError> {
        let update = Account {
            token: Some(String::new()),
            ..Account::with_id(account_id)
        };
        credentials.put_account(&update).await
    }
}
