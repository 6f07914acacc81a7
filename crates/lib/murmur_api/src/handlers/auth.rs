//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::models::{CredentialsRequest, StatusResponse};
use crate::services::auth;
use crate::services::cookies::{TOKEN_COOKIE, clear_token_cookie, token_cookie};

/// `POST /signup`: create an account and sign it in.
pub async fn signup_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> AppResult<(CookieJar, Json<StatusResponse>)> {
    let token = auth::signup(&state, &body.username, &body.password).await?;
    let jar = jar.add(token_cookie(&token, state.tokens.ttl().num_seconds()));
    Ok((jar, Json(StatusResponse::success())))
}

/// `POST /signin`: check a login and open a session.
pub async fn signin_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> AppResult<(CookieJar, Json<StatusResponse>)> {
    let token = auth::signin(&state, &body.username, &body.password).await?;
    let jar = jar.add(token_cookie(&token, state.tokens.ttl().num_seconds()));
    Ok((jar, Json(StatusResponse::success())))
}

/// `POST /signout`: revoke the live session and expire the cookie.
pub async fn signout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<StatusResponse>)> {
    let presented = jar.get(TOKEN_COOKIE).map(|c| c.value().to_string());
    auth::signout(&state, presented.as_deref()).await?;
    Ok((jar.add(clear_token_cookie()), Json(StatusResponse::success())))
}
