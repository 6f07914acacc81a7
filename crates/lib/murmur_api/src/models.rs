//! Request and response bodies.

use murmur_core::feed::FeedSnapshot;
use murmur_core::models::{Account, Post};
use serde::{Deserialize, Serialize};

use crate::middleware::auth::Identity;

/// Body for `/signup` and `/signin`.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// `{"status": "..."}`, the shape of every plain outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn success() -> Self {
        Self::new("success")
    }
}

/// Body for `POST /posts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub text: String,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default, alias = "media_type")]
    pub media_type: Option<String>,
}

/// Body for `POST /reply`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub parent: String,
    pub text: String,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default, alias = "media_type")]
    pub media_type: Option<String>,
}

/// Result of a post or reply submission.
#[derive(Debug, Clone, Serialize)]
pub struct PostCreatedResponse {
    pub status: String,
    #[serde(rename = "replyID")]
    pub reply_id: String,
    pub item: Post,
}

/// Result of a like or friend toggle: `score` is 1 when added, 0 when removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub score: i64,
}

/// Body for `PUT /profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub work: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub profile_bg: Option<String>,
}

/// `GET /`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamView {
    pub app_name: String,
    pub user: Identity,
    /// Shared with the feed cache; serialized in place.
    pub stream: FeedSnapshot,
}

/// `GET /recent` and `GET /view/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    pub user: Identity,
    pub posts: Vec<Post>,
}

/// `GET /user/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: Identity,
    pub profile: Account,
    pub posts: Vec<Post>,
    pub likes: Vec<Post>,
}

/// `GET /health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub service: String,
    pub version: String,
    pub store_connected: bool,
}
