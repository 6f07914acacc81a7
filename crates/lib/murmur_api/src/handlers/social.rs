//! Like and friend toggles.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use murmur_core::store::Toggle;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::Identity;
use crate::models::ToggleResponse;

fn toggled(toggle: Toggle) -> Json<ToggleResponse> {
    Json(ToggleResponse {
        success: true,
        score: 1 - toggle.removed_count(),
    })
}

/// `POST /like/{id}`: like the post, or un-like it if already liked.
pub async fn like_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let claims = identity.require()?;
    let toggle = state.graph.toggle_like(claims.account_id(), &post_id).await?;
    Ok(toggled(toggle))
}

/// `POST /addFriend/{id}`: befriend the account, or un-friend it.
pub async fn add_friend_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(target_id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let claims = identity.require()?;
    let toggle = state
        .graph
        .toggle_friend(claims.account_id(), &target_id)
        .await?;
    Ok(toggled(toggle))
}
