//! Signup, signin and signout flows over `murmur_core::auth`.

use std::sync::LazyLock;

use chrono::Utc;
use murmur_core::auth::password::{hash_password, verify_password};
use murmur_core::auth::AuthError;
use murmur_core::models::account::{DEFAULT_PROFILE_BG, DEFAULT_PROFILE_PIC};
use murmur_core::models::{Account, SessionClaims, generate_id};
use murmur_core::store::StoreError;
use regex::Regex;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult, BAD_PASSWORD, USER_EXISTS};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 7;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check signup input, returning the status text shown for a bad field.
pub fn validate_signup(username: &str, password: &str) -> AppResult<()> {
    if !is_valid_email(username) {
        return Err(AppError::Validation("Invalid Username (E1)".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation("Invalid Password (E2)".into()));
    }
    Ok(())
}

/// Runs bcrypt on the blocking pool.
async fn hash_blocking(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {e}")))?
        .map_err(AppError::from)
}

async fn verify_blocking(password: &str, hash: &str) -> AppResult<bool> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task: {e}")))?
        .map_err(AppError::from)
}

/// Create an account and open its first session.
///
/// Returns the session token. If any step after the credential write fails,
/// the credential is removed again so the login id can be reused.
pub async fn signup(state: &AppState, username: &str, password: &str) -> AppResult<String> {
    validate_signup(username, password)?;

    if state.credentials.credential_exists(username).await? {
        return Err(AppError::Conflict(USER_EXISTS.into()));
    }

    let hash = hash_blocking(password, state.config.bcrypt_cost).await?;
    match state.credentials.put_credential(username, &hash).await {
        Ok(()) => {}
        Err(AuthError::Store(StoreError::Rejected(_))) => {
            return Err(AppError::Conflict(USER_EXISTS.into()));
        }
        Err(e) => return Err(e.into()),
    }

    let account_id = generate_id();
    match open_account(state, username, &hash, &account_id).await {
        Ok(token) => {
            info!(%account_id, "account created");
            Ok(token)
        }
        Err(e) => {
            if let Err(rollback) = state.credentials.remove_credential(username, &hash).await {
                warn!(error = %rollback, "failed to roll back credential after signup error");
            }
            Err(e)
        }
    }
}

async fn open_account(
    state: &AppState,
    username: &str,
    hash: &str,
    account_id: &str,
) -> AppResult<String> {
    state.credentials.put_hash_index(hash, account_id).await?;

    let account = Account {
        email: Some(username.to_string()),
        joined: Some(Utc::now()),
        profile_pic: Some(DEFAULT_PROFILE_PIC.to_string()),
        profile_bg: Some(DEFAULT_PROFILE_BG.to_string()),
        score: Some(0),
        ..Account::with_id(account_id)
    };
    state.credentials.put_account(&account).await?;
    state.graph.register_account(account_id).await?;

    start_session(state, username, account).await
}

/// Check a login and open a new session, superseding any earlier one.
///
/// Every failure short of a store outage reads as [`BAD_PASSWORD`], so the
/// response never reveals whether the login id exists.
pub async fn signin(state: &AppState, username: &str, password: &str) -> AppResult<String> {
    let hash = match state.credentials.get_hash(username).await {
        Ok(hash) => hash,
        Err(AuthError::NotFound(_)) => return Err(AuthError::CredentialError.into()),
        Err(e) => return Err(e.into()),
    };

    let matches = verify_blocking(password, &hash).await.unwrap_or_else(|e| {
        warn!(error = %e, "stored hash could not be checked");
        false
    });
    if !matches {
        return Err(AppError::Unauthorized(BAD_PASSWORD.into()));
    }

    let account_id = state.credentials.get_account_id(&hash).await?;
    let account = state.credentials.get_account(&account_id).await?;
    let token = start_session(state, username, account).await?;
    info!(%account_id, "signed in");
    Ok(token)
}

async fn start_session(
    state: &AppState,
    username: &str,
    account: Account,
) -> AppResult<String> {
    let mut claims = SessionClaims::new(username, account);
    claims.is_logged_in = true;
    let (token, _) = state.tokens.renew(&state.credentials, claims).await?;
    Ok(token)
}

/// Invalidate the session behind `presented`, if it is still the live one.
///
/// Stale or garbage tokens are ignored; signing out always succeeds.
pub async fn signout(state: &AppState, presented: Option<&str>) -> AppResult<()> {
    let Some(token) = presented.filter(|t| !t.is_empty()) else {
        return Ok(());
    };
    let Ok(claims) = state.tokens.verify(token) else {
        return Ok(());
    };
    let account = match state.credentials.get_account(claims.account_id()).await {
        Ok(account) => account,
        Err(AuthError::NotFound(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if account.token.as_deref() == Some(token) {
        state.tokens.revoke(&state.credentials, &account.id).await?;
        info!(account_id = %account.id, "signed out");
    }
    Ok(())
}
