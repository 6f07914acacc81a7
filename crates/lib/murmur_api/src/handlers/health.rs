//! Health endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health`: service version and store reachability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = match state.kv.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("store ping failed: {e}");
            false
        }
    };
    Json(HealthResponse {
        service: "murmur".into(),
        version: murmur_core::version().into(),
        store_connected,
    })
}
