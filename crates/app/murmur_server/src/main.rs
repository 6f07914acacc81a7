//! Murmur HTTP server binary.
//!
//! Reads configuration from flags, the environment and an optional `.env`
//! file, connects the store, starts the feed refresher and serves the API
//! until interrupted.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use murmur_api::config::{
    ApiConfig, DEFAULT_APP_NAME, DEFAULT_FEED_REFRESH_MS, DEFAULT_REDIS_URL,
};
use murmur_core::auth::password::BCRYPT_COST;
use murmur_core::auth::token::TOKEN_TTL_SECS;
use murmur_core::store::{KvStore, MemoryStore, RedisStore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_LOG_FILTER: &str = "info,murmur_api=debug,murmur_core=debug";

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "murmur_server", about = "Murmur social API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3100)]
    port: u16,

    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    redis_url: String,

    /// Secret used to sign session tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// bcrypt cost for new passwords.
    #[arg(long, env = "BCRYPT_COST", default_value_t = BCRYPT_COST)]
    bcrypt_cost: u32,

    /// Session token and cookie lifetime in seconds.
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = TOKEN_TTL_SECS)]
    token_ttl_secs: i64,

    /// Milliseconds between feed rebuilds.
    #[arg(long, env = "FEED_REFRESH_MS", default_value_t = DEFAULT_FEED_REFRESH_MS)]
    feed_refresh_ms: u64,

    /// Site name shown in views.
    #[arg(long, env = "APP_NAME", default_value = DEFAULT_APP_NAME)]
    app_name: String,

    /// Keep all data in process memory instead of Redis. Data is lost on exit.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("failed to listen for ctrl-c: {e}");
            }
            info!("interrupt received, shutting down");
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    if args.jwt_secret.is_empty() {
        return Err("JWT_SECRET must not be empty".into());
    }

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        redis_url: args.redis_url,
        jwt_secret: args.jwt_secret,
        bcrypt_cost: args.bcrypt_cost,
        token_ttl_secs: args.token_ttl_secs,
        feed_refresh_ms: args.feed_refresh_ms,
        app_name: args.app_name,
    };
    info!(?config, in_memory = args.in_memory, "starting murmur_server");

    let kv: Arc<dyn KvStore> = if args.in_memory {
        warn!("using in-memory store; data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = RedisStore::connect(&config.redis_url).await?;
        store.ping().await?;
        Arc::new(store)
    };

    let state = murmur_api::AppState::new(config.clone(), kv);

    let cancel = CancellationToken::new();
    let refresher = state.feed.spawn(
        state.graph.clone(),
        Duration::from_millis(config.feed_refresh_ms),
        cancel.clone(),
    );

    let app = murmur_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP API listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await;

    // Stop the refresher whichever way serving ended.
    cancel.cancel();
    if let Err(e) = refresher.await {
        warn!("feed refresher ended abnormally: {e}");
    }

    served?;
    info!("murmur_server stopped");
    Ok(())
}
