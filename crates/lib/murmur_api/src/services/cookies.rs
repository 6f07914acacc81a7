//! Session cookie builders.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// httpOnly session cookie living as long as the token it carries.
pub fn token_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Expired session cookie, used to clear the browser's copy.
pub fn clear_token_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE.to_string(), String::new()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
