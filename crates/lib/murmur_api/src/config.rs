//! API server configuration.

use murmur_core::auth::password::BCRYPT_COST;
use murmur_core::auth::token::TOKEN_TTL_SECS;

/// Default HTTP listener address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";
/// Default Redis connection URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
/// Default interval between feed rebuilds, in milliseconds.
pub const DEFAULT_FEED_REFRESH_MS: u64 = 2_000;
/// Site name shown in views.
pub const DEFAULT_APP_NAME: &str = "murmur";

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// bcrypt cost for new credentials.
    pub bcrypt_cost: u32,
    /// Session token and cookie lifetime.
    pub token_ttl_secs: i64,
    pub feed_refresh_ms: u64,
    pub app_name: String,
}

impl ApiConfig {
    /// Defaults for everything except the secret, which has none.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            redis_url: DEFAULT_REDIS_URL.into(),
            jwt_secret: jwt_secret.into(),
            bcrypt_cost: BCRYPT_COST,
            token_ttl_secs: TOKEN_TTL_SECS,
            feed_refresh_ms: DEFAULT_FEED_REFRESH_MS,
            app_name: DEFAULT_APP_NAME.into(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("redis_url", &self.redis_url)
            .field("jwt_secret", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("feed_refresh_ms", &self.feed_refresh_ms)
            .field("app_name", &self.app_name)
            .finish()
    }
}
