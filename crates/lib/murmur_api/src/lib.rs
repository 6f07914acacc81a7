//! # murmur_api
//!
//! HTTP API library for Murmur.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use murmur_core::auth::{CredentialStore, TokenManager};
use murmur_core::feed::FeedCache;
use murmur_core::graph::SocialGraph;
use murmur_core::store::KvStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, posts, profile, social, stream};

/// Requests running longer than this are answered with 408.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Backing key/value store.
    pub kv: Arc<dyn KvStore>,
    pub credentials: CredentialStore,
    pub tokens: TokenManager,
    pub graph: SocialGraph,
    /// Latest ranked stream, refreshed in the background.
    pub feed: Arc<FeedCache>,
}

impl AppState {
    /// Wire the domain services over one store.
    pub fn new(config: ApiConfig, kv: Arc<dyn KvStore>) -> Self {
        let tokens = TokenManager::with_ttl(
            config.jwt_secret.as_bytes(),
            chrono::Duration::seconds(config.token_ttl_secs),
        );
        Self {
            credentials: CredentialStore::new(kv.clone()),
            graph: SocialGraph::new(kv.clone()),
            feed: Arc::new(FeedCache::new()),
            tokens,
            kv,
            config,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Credential routes manage the cookie themselves.
    let public = Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/signin", post(auth::signin_handler))
        .route("/signout", post(auth::signout_handler))
        .route("/health", get(health::health_handler));

    // Session-aware routes: anonymous callers get through, mutations check
    // the identity themselves.
    let session = Router::new()
        .route("/", get(stream::stream_handler))
        .route("/recent", get(posts::recent_handler))
        .route("/view/{id}", get(posts::view_handler))
        .route("/user/{id}", get(profile::profile_handler))
        .route("/posts", post(posts::create_post_handler))
        .route("/reply", post(posts::reply_handler))
        .route("/profile", put(profile::update_profile_handler))
        .route("/like/{id}", post(social::like_handler))
        .route("/addFriend/{id}", post(social::add_friend_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::check_auth,
        ));

    Router::new()
        .merge(public)
        .merge(session)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(axum::middleware::map_response(middleware::timeout::timeout_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
