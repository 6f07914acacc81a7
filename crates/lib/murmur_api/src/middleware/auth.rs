//! Session middleware: cookie extraction, token verification and renewal.
//!
//! Every request passes through [`check_auth`], which never rejects. A valid
//! session is renewed and the new token is sent back in the cookie; anything
//! else is downgraded to [`Identity::Anonymous`]. Handlers that need a
//! signed-in caller use [`Identity::require`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use murmur_core::auth::AuthError;
use murmur_core::models::SessionClaims;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::cookies::{TOKEN_COOKIE, token_cookie};

/// Who is making the request. Inserted into request extensions.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Anonymous,
    Authenticated(Box<SessionClaims>),
}

impl Identity {
    /// Claims of a signed-in caller, or `Unauthorized`.
    pub fn require(&self) -> AppResult<&SessionClaims> {
        match self {
            Identity::Authenticated(claims) => Ok(claims),
            Identity::Anonymous => Err(AppError::Unauthorized("Not signed in".into())),
        }
    }

    pub fn account_id(&self) -> Option<&str> {
        match self {
            Identity::Authenticated(claims) => Some(claims.account_id()),
            Identity::Anonymous => None,
        }
    }
}

/// Anonymous callers render as `{"isLoggedIn": false}`, signed-in callers as
/// their full claims.
impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Identity::Authenticated(claims) => claims.serialize(serializer),
            Identity::Anonymous => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("isLoggedIn", &false)?;
                map.end()
            }
        }
    }
}

/// Verify the presented token and renew it.
///
/// The token must carry a valid signature, be unexpired, and equal the token
/// stored for the account: a token superseded by a later renewal is refused.
async fn authenticate(
    state: &AppState,
    presented: &str,
) -> Result<(String, SessionClaims), AuthError> {
    let mut claims = state.tokens.verify(presented)?;
    let account = state.credentials.get_account(claims.account_id()).await?;
    if account.token.as_deref() != Some(presented) {
        return Err(AuthError::InvalidToken("token superseded".into()));
    }
    claims.is_logged_in = true;
    claims.user = account;
    state.tokens.renew(&state.credentials, claims).await
}

/// Axum middleware: reads the `token` cookie, attaches an [`Identity`] and
/// sets the renewed cookie on the response.
pub async fn check_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = jar.get(TOKEN_COOKIE).map(|c| c.value().to_string());

    let (identity, renewed) = match presented.as_deref() {
        None | Some("") => (Identity::Anonymous, None),
        Some(token) => match authenticate(&state, token).await {
            Ok((token, mut claims)) => {
                // The token travels in the httpOnly cookie only.
                claims.user.token = None;
                (Identity::Authenticated(Box::new(claims)), Some(token))
            }
            Err(e) => {
                debug!(error = %e, "session not accepted, continuing anonymously");
                (Identity::Anonymous, None)
            }
        },
    };

    request.extensions_mut().insert(identity);
    let response = next.run(request).await;

    match renewed {
        Some(token) => {
            let jar = jar.add(token_cookie(&token, state.tokens.ttl().num_seconds()));
            (jar, response).into_response()
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use murmur_core::models::Account;

    use super::*;

    #[test]
    fn anonymous_serializes_as_logged_out() {
        let json = serde_json::to_value(Identity::Anonymous).unwrap();
        assert_eq!(json, serde_json::json!({ "isLoggedIn": false }));
    }

    #[test]
    fn authenticated_serializes_as_claims() {
        let mut claims = SessionClaims::new("a@b.co", Account::with_id("u1"));
        claims.is_logged_in = true;
        let json = serde_json::to_value(Identity::Authenticated(Box::new(claims))).unwrap();
        assert_eq!(json["isLoggedIn"], true);
        assert_eq!(json["user"]["id"], "u1");
    }

    #[test]
    fn require_rejects_anonymous() {
        assert!(matches!(
            Identity::Anonymous.require(),
            Err(AppError::Unauthorized(_))
        ));
        assert_eq!(Identity::Anonymous.account_id(), None);
    }
}
