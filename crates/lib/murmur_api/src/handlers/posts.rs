//! Post submission and thread views.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use murmur_core::models::{Post, generate_id};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::Identity;
use crate::models::{CreatePostRequest, PostCreatedResponse, ReplyRequest, ThreadView};

/// Largest page `GET /recent` will return.
pub const MAX_RECENT: usize = 100;
const DEFAULT_RECENT: usize = 20;

/// Query for `GET /recent`.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

fn new_post(
    author: &str,
    parent: &str,
    text: String,
    media: Option<String>,
    media_type: Option<String>,
) -> AppResult<Post> {
    let media = media.unwrap_or_default();
    if text.trim().is_empty() && media.is_empty() {
        return Err(AppError::Validation("Empty Post".into()));
    }
    let now = Utc::now();
    Ok(Post {
        id: generate_id(),
        parent: parent.to_string(),
        author: author.to_string(),
        ts: Some(now),
        time_string: now.format("%d %b %y %H:%M UTC").to_string(),
        text,
        kind: if media.is_empty() {
            String::new()
        } else {
            "Media".to_string()
        },
        media,
        media_type: media_type.unwrap_or_default(),
        score: 0,
        comments: Vec::new(),
    })
}

async fn submit(state: &AppState, post: Post) -> AppResult<Json<PostCreatedResponse>> {
    state.graph.create_post(&post).await?;
    info!(post_id = %post.id, parent = %post.parent, "post submitted");
    Ok(Json(PostCreatedResponse {
        status: "success".into(),
        reply_id: post.id.clone(),
        item: post,
    }))
}

/// `POST /posts`: publish a root post.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> AppResult<Json<PostCreatedResponse>> {
    let claims = identity.require()?;
    let post = new_post(claims.account_id(), "", body.text, body.media, body.media_type)?;
    submit(&state, post).await
}

/// `POST /reply`: reply to an existing post.
pub async fn reply_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(body): ApiJson<ReplyRequest>,
) -> AppResult<Json<PostCreatedResponse>> {
    let claims = identity.require()?;
    if body.parent.is_empty() {
        return Err(AppError::Validation("Missing Parent".into()));
    }
    let post = new_post(
        claims.account_id(),
        &body.parent,
        body.text,
        body.media,
        body.media_type,
    )?;
    submit(&state, post).await
}

/// `GET /view/{id}`: one post with its replies.
pub async fn view_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<ThreadView>> {
    let posts = state.graph.get_thread(std::slice::from_ref(&id)).await?;
    if posts.is_empty() {
        return Err(AppError::NotFound(format!("post {id}")));
    }
    Ok(Json(ThreadView {
        user: identity,
        posts,
    }))
}

/// `GET /recent`: newest root posts with their replies.
pub async fn recent_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<ThreadView>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT).min(MAX_RECENT);
    let ids = state.graph.recent_post_ids(limit).await?;
    let posts = state.graph.get_thread(&ids).await?;
    Ok(Json(ThreadView {
        user: identity,
        posts,
    }))
}
