//! Request extractors whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with malformed or mistyped bodies answered as
/// `400 {"status": ...}` like every other API error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde::Deserialize;

    use super::*;
    use crate::error::INVALID_REQUEST;

    #[derive(Debug, Deserialize)]
    struct Login {
        username: String,
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let ApiJson(login) = ApiJson::<Login>::from_request(json_request(r#"{"username":"ann"}"#), &())
            .await
            .unwrap();
        assert_eq!(login.username, "ann");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        match ApiJson::<Login>::from_request(json_request("{not json"), &()).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, INVALID_REQUEST),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_field_is_a_validation_error() {
        let result = ApiJson::<Login>::from_request(json_request("{}"), &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
