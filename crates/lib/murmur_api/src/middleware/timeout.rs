//! Timeout responses in the API error format.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::AppError;

/// Replace the empty 408 produced by the timeout layer with the usual
/// `{"status": ...}` body. Responses that already carry a body pass through.
pub async fn timeout_body(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }
    warn!("request timed out");
    AppError::Timeout.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::REQUEST_TIMED_OUT;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bare_timeout_gets_status_body() {
        let response = timeout_body(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "status": REQUEST_TIMED_OUT })
        );
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let response = timeout_body(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
    }
}
