//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use murmur_core::auth::AuthError;
use murmur_core::graph::GraphError;
use murmur_core::store::StoreError;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::StatusResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Status text for a failed signin, whatever the cause.
pub const BAD_PASSWORD: &str = "Bad Password";
/// Status text for a signup whose login id is taken.
pub const USER_EXISTS: &str = "User Exists";
/// Status text for a body that is not the expected JSON.
pub const INVALID_REQUEST: &str = "Invalid Request";
/// Status text for a request cut off by the timeout layer.
pub const REQUEST_TIMED_OUT: &str = "Request Timeout";

/// Application-level errors with HTTP status mapping.
///
/// The response body is always `{"status": "<message>"}`; detail for
/// store and internal failures only goes to the log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.as_str()),
            AppError::Timeout => (StatusCode::REQUEST_TIMEOUT, REQUEST_TIMED_OUT),
            AppError::StoreUnavailable(detail) => {
                error!(%detail, "store failure");
                (StatusCode::SERVICE_UNAVAILABLE, "Database Error")
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(StatusResponse::new(message))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), reason = %rejection.body_text(), "json body rejected");
        AppError::Validation(INVALID_REQUEST.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(msg) => AppError::Conflict(msg),
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized(BAD_PASSWORD.into()),
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::InvalidInput(msg) => AppError::Validation(msg),
            AuthError::InvalidToken(msg) => {
                warn!(reason = %msg, "token rejected");
                AppError::Unauthorized("Invalid session".into())
            }
            AuthError::Hashing(msg) | AuthError::RenewalError(msg) => AppError::Internal(msg),
            AuthError::Store(e) => AppError::from(e),
        }
    }
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NotFound(msg) => AppError::NotFound(msg),
            GraphError::InvalidInput(msg) => AppError::Validation(msg),
            GraphError::Store(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_write_is_a_conflict() {
        let err = AppError::from(AuthError::Store(StoreError::Rejected("taken".into())));
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn store_failures_hide_detail() {
        let resp = AppError::StoreUnavailable("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn timeout_is_408() {
        let resp = AppError::Timeout.into_response();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn credential_error_reads_as_bad_password() {
        match AppError::from(AuthError::CredentialError) {
            AppError::Unauthorized(msg) => assert_eq!(msg, BAD_PASSWORD),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
