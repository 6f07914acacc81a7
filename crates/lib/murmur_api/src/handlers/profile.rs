//! Profile view and edit.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use murmur_core::graph::PROFILE_LIKES_LIMIT;
use murmur_core::models::{Account, Post};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::Identity;
use crate::models::{ProfileView, StatusResponse, UpdateProfileRequest};

async fn load_posts(state: &AppState, ids: &[String]) -> AppResult<Vec<Post>> {
    let mut posts = Vec::with_capacity(ids.len());
    for id in ids {
        let post = state.graph.get_post(id).await?;
        if !post.is_missing() {
            posts.push(post);
        }
    }
    Ok(posts)
}

/// `GET /user/{id}`: profile with its posts, recent likes and friends.
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(account_id): Path<String>,
) -> AppResult<Json<ProfileView>> {
    let mut profile = state.credentials.get_account(&account_id).await?;
    profile.token = None;
    if identity.account_id() != Some(account_id.as_str()) {
        profile.email = None;
    }
    profile.apply_profile_defaults();
    state.graph.load_engagement(&mut profile).await?;

    let posts = load_posts(&state, &profile.posts).await?;
    let liked = state
        .graph
        .liked_post_ids(&account_id, PROFILE_LIKES_LIMIT)
        .await?;
    let likes = load_posts(&state, &liked).await?;

    Ok(Json(ProfileView {
        user: identity,
        profile,
        posts,
        likes,
    }))
}

/// `PUT /profile`: update the caller's own profile fields.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<StatusResponse>> {
    let claims = identity.require()?;
    let update = Account {
        about: body.about,
        work: body.work,
        location: body.location,
        profile_pic: body.profile_pic,
        profile_bg: body.profile_bg,
        ..Account::with_id(claims.account_id())
    };
    state.credentials.put_account(&update).await?;
    Ok(Json(StatusResponse::success()))
}
