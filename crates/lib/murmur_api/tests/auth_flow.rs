//! Integration tests: build the router over an in-memory store and drive it
//! with `oneshot`, carrying the session cookie between requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use murmur_api::{AppState, config::ApiConfig};
use murmur_core::store::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

const PASSWORD: &str = "hunter22";

fn test_state() -> AppState {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = ApiConfig {
        bcrypt_cost: 4,
        ..ApiConfig::with_secret("test-secret")
    };
    AppState::new(config, Arc::new(MemoryStore::new()))
}

struct Reply {
    status: StatusCode,
    body: Value,
    set_cookie: Option<String>,
}

impl Reply {
    /// Value of the `token` cookie set by this response, if any.
    fn token(&self) -> Option<String> {
        let raw = self.set_cookie.as_deref()?;
        let pair = raw.split(';').next()?;
        pair.strip_prefix("token=").map(str::to_string)
    }
}

async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::COOKIE, format!("token={token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    dispatch(state, req).await
}

async fn dispatch(state: &AppState, req: Request<Body>) -> Reply {
    let resp = murmur_api::router(state.clone())
        .oneshot(req)
        .await
        .expect("request");
    let status = resp.status();
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    Reply {
        status,
        body,
        set_cookie,
    }
}

fn credentials(username: &str, password: &str) -> Option<Value> {
    Some(json!({ "username": username, "password": password }))
}

async fn signup(state: &AppState, username: &str) -> String {
    let reply = send(state, "POST", "/signup", None, credentials(username, PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::OK, "signup failed: {}", reply.body);
    reply.token().expect("signup sets token cookie")
}

#[tokio::test]
async fn signup_sets_session_cookie() {
    let state = test_state();
    let reply = send(
        &state,
        "POST",
        "/signup",
        None,
        credentials("alice@example.com", PASSWORD),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "status": "success" }));
    let cookie = reply.set_cookie.as_deref().expect("cookie set");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=3600"));
}

#[tokio::test]
async fn cookie_max_age_follows_token_ttl() {
    let config = ApiConfig {
        bcrypt_cost: 4,
        token_ttl_secs: 120,
        ..ApiConfig::with_secret("test-secret")
    };
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    let reply = send(&state, "POST", "/signup", None, credentials("ttl@example.com", PASSWORD)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.set_cookie.as_deref().expect("cookie set");
    assert!(cookie.contains("Max-Age=120"), "{cookie}");

    let token = reply.token().expect("token");
    let renewed = send(&state, "GET", "/", Some(&token), None).await;
    let cookie = renewed.set_cookie.as_deref().expect("renewed cookie");
    assert!(cookie.contains("Max-Age=120"), "{cookie}");
}

#[tokio::test]
async fn malformed_json_gets_status_body() {
    let state = test_state();
    let token = signup(&state, "carol@example.com").await;

    for (uri, cookie) in [("/signin", None), ("/signup", None), ("/posts", Some(&token))] {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = cookie {
            req = req.header(header::COOKIE, format!("token={token}"));
        }
        let reply = dispatch(&state, req.body(Body::from("{not json")).unwrap()).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.body, json!({ "status": "Invalid Request" }), "{uri}");
    }

    // Valid JSON of the wrong shape is rejected the same way.
    let reply = send(&state, "POST", "/signin", None, Some(json!({ "user": 1 }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["status"], "Invalid Request");
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let state = test_state();
    signup(&state, "alice@example.com").await;
    let reply = send(
        &state,
        "POST",
        "/signup",
        None,
        credentials("alice@example.com", "another-password"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body, json!({ "status": "User Exists" }));
    assert!(reply.token().is_none());
}

#[tokio::test]
async fn signup_validates_input() {
    let state = test_state();
    let bad_email = send(&state, "POST", "/signup", None, credentials("alice", PASSWORD)).await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.body["status"], "Invalid Username (E1)");

    let short = send(
        &state,
        "POST",
        "/signup",
        None,
        credentials("alice@example.com", "123456"),
    )
    .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["status"], "Invalid Password (E2)");
}

#[tokio::test]
async fn signin_failures_all_read_as_bad_password() {
    let state = test_state();
    signup(&state, "alice@example.com").await;

    let wrong = send(
        &state,
        "POST",
        "/signin",
        None,
        credentials("alice@example.com", "wrong-password"),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, json!({ "status": "Bad Password" }));
    assert!(wrong.token().is_none());

    let unknown = send(
        &state,
        "POST",
        "/signin",
        None,
        credentials("nobody@example.com", PASSWORD),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, wrong.body);
}

#[tokio::test]
async fn signin_supersedes_earlier_session() {
    let state = test_state();
    let first = signup(&state, "alice@example.com").await;

    let reply = send(
        &state,
        "POST",
        "/signin",
        None,
        credentials("alice@example.com", PASSWORD),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let second = reply.token().expect("signin sets cookie");
    assert_ne!(first, second);

    let stale = send(&state, "GET", "/", Some(&first), None).await;
    assert_eq!(stale.body["user"], json!({ "isLoggedIn": false }));
    assert!(stale.token().is_none());

    let live = send(&state, "GET", "/", Some(&second), None).await;
    assert_eq!(live.body["user"]["isLoggedIn"], true);
    assert_eq!(live.body["user"]["username"], "alice@example.com");
}

#[tokio::test]
async fn every_request_renews_the_session() {
    let state = test_state();
    let first = signup(&state, "alice@example.com").await;

    let reply = send(&state, "GET", "/", Some(&first), None).await;
    assert_eq!(reply.body["user"]["isLoggedIn"], true);
    assert!(reply.body["user"]["user"].get("token").is_none());
    let second = reply.token().expect("renewed cookie");
    assert_ne!(first, second);

    // Only the newest token is accepted.
    let old = send(&state, "GET", "/", Some(&first), None).await;
    assert_eq!(old.body["user"]["isLoggedIn"], false);
    let new = send(&state, "GET", "/", Some(&second), None).await;
    assert_eq!(new.body["user"]["isLoggedIn"], true);
}

#[tokio::test]
async fn garbage_cookie_is_anonymous() {
    let state = test_state();
    let reply = send(&state, "GET", "/", Some("not.a.token"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["user"], json!({ "isLoggedIn": false }));
    assert_eq!(reply.body["appName"], "murmur");
}

#[tokio::test]
async fn anonymous_mutations_are_unauthorized() {
    let state = test_state();
    let like = send(&state, "POST", "/like/p1", None, None).await;
    assert_eq!(like.status, StatusCode::UNAUTHORIZED);
    assert!(like.body["status"].is_string());

    let post = send(&state, "POST", "/posts", None, Some(json!({ "text": "hi" }))).await;
    assert_eq!(post.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn like_toggles_score_one_then_zero() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;

    let created = send(
        &state,
        "POST",
        "/posts",
        Some(&token),
        Some(json!({ "text": "first post" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["status"], "success");
    let post_id = created.body["replyID"].as_str().unwrap().to_string();
    assert_eq!(created.body["item"]["uptext"], "first post");
    let token = created.token().unwrap();

    let liked = send(&state, "POST", &format!("/like/{post_id}"), Some(&token), None).await;
    assert_eq!(liked.body, json!({ "success": true, "score": 1 }));
    assert_eq!(state.graph.get_post(&post_id).await.unwrap().score, 1);
    let token = liked.token().unwrap();

    let unliked = send(&state, "POST", &format!("/like/{post_id}"), Some(&token), None).await;
    assert_eq!(unliked.body, json!({ "success": true, "score": 0 }));
    assert_eq!(state.graph.get_post(&post_id).await.unwrap().score, 0);
}

#[tokio::test]
async fn liking_a_missing_post_is_not_found() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;
    let reply = send(&state, "POST", "/like/ghost", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replies_nest_under_their_parent() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;

    let root = send(
        &state,
        "POST",
        "/posts",
        Some(&token),
        Some(json!({ "text": "root" })),
    )
    .await;
    let root_id = root.body["replyID"].as_str().unwrap().to_string();
    let token = root.token().unwrap();

    let reply = send(
        &state,
        "POST",
        "/reply",
        Some(&token),
        Some(json!({ "parent": root_id, "text": "a reply" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply_id = reply.body["replyID"].as_str().unwrap().to_string();
    let token = reply.token().unwrap();

    let orphan = send(
        &state,
        "POST",
        "/reply",
        Some(&token),
        Some(json!({ "parent": "ghost", "text": "lost" })),
    )
    .await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);

    let view = send(&state, "GET", &format!("/view/{root_id}"), None, None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["posts"][0]["id"], root_id.as_str());
    assert_eq!(view.body["posts"][0]["comments"][0]["id"], reply_id.as_str());

    let recent = send(&state, "GET", "/recent", None, None).await;
    let ids: Vec<&str> = recent.body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![root_id.as_str()]);
}

#[tokio::test]
async fn stream_serves_the_feed_snapshot() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;
    send(
        &state,
        "POST",
        "/posts",
        Some(&token),
        Some(json!({ "text": "hello" })),
    )
    .await;

    let before = send(&state, "GET", "/", None, None).await;
    assert_eq!(before.body["stream"], json!([]));

    state.feed.refresh(&state.graph).await.unwrap();
    let after = send(&state, "GET", "/", None, None).await;
    assert_eq!(after.body["stream"][0]["uptext"], "hello");
}

#[tokio::test]
async fn friends_and_profiles() {
    let state = test_state();
    let alice = signup(&state, "alice@example.com").await;
    let bob = signup(&state, "bob@example.com").await;

    let bob_view = send(&state, "GET", "/", Some(&bob), None).await;
    let bob_id = bob_view.body["user"]["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let added = send(&state, "POST", &format!("/addFriend/{bob_id}"), Some(&alice), None).await;
    assert_eq!(added.body, json!({ "success": true, "score": 1 }));
    let alice = added.token().unwrap();

    let unknown = send(&state, "POST", "/addFriend/ghost", Some(&alice), None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let profile = send(&state, "GET", &format!("/user/{bob_id}"), None, None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["profile"]["id"], bob_id.as_str());
    assert_eq!(profile.body["profile"]["profile_pic"], "public/media/ndt.jpg");
    assert_eq!(profile.body["profile"]["profile_bg"], "public/media/hubble.jpg");
    assert!(profile.body["profile"].get("token").is_none());
    assert!(profile.body["profile"].get("email").is_none());

    let missing = send(&state, "GET", "/user/ghost", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_merges_fields() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;

    let first = send(
        &state,
        "PUT",
        "/profile",
        Some(&token),
        Some(json!({ "about": "hello", "work": "pilot" })),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    let token = first.token().unwrap();

    let second = send(
        &state,
        "PUT",
        "/profile",
        Some(&token),
        Some(json!({ "location": "moon" })),
    )
    .await;
    let token = second.token().unwrap();

    let me = send(&state, "GET", "/", Some(&token), None).await;
    let id = me.body["user"]["user"]["id"].as_str().unwrap().to_string();
    let account = state.credentials.get_account(&id).await.unwrap();
    assert_eq!(account.about.as_deref(), Some("hello"));
    assert_eq!(account.work.as_deref(), Some("pilot"));
    assert_eq!(account.location.as_deref(), Some("moon"));
    assert_eq!(account.email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn signout_revokes_session_and_expires_cookie() {
    let state = test_state();
    let token = signup(&state, "alice@example.com").await;

    let reply = send(&state, "POST", "/signout", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.set_cookie.as_deref().expect("cookie cleared");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));

    let after = send(&state, "GET", "/", Some(&token), None).await;
    assert_eq!(after.body["user"], json!({ "isLoggedIn": false }));
}

#[tokio::test]
async fn health_reports_store() {
    let state = test_state();
    let reply = send(&state, "GET", "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["storeConnected"], true);
    assert_eq!(reply.body["version"], murmur_core::version());
}
