//! Front page stream.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::middleware::auth::Identity;
use crate::models::StreamView;

/// `GET /`: the latest feed snapshot. Never touches the store.
pub async fn stream_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<StreamView> {
    Json(StreamView {
        app_name: state.config.app_name.clone(),
        user: identity,
        stream: state.feed.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use murmur_core::models::Post;
    use murmur_core::store::MemoryStore;

    use super::*;
    use crate::config::ApiConfig;

    #[tokio::test]
    async fn stream_shares_the_published_snapshot() {
        let state = AppState::new(
            ApiConfig::with_secret("test-secret"),
            Arc::new(MemoryStore::new()),
        );
        let post = Post {
            id: "p1".into(),
            author: "u1".into(),
            text: "hello".into(),
            ..Post::default()
        };
        state.graph.create_post(&post).await.unwrap();
        state.feed.refresh(&state.graph).await.unwrap();

        let Json(view) = stream_handler(State(state.clone()), Extension(Identity::Anonymous)).await;
        assert!(Arc::ptr_eq(&view.stream, &state.feed.snapshot()));
        assert_eq!(view.stream.len(), 1);
        assert_eq!(view.stream[0].id, "p1");
    }
}
