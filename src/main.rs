//! API gateway entry point.
//!
//! Loads configuration (TOML file via GATEWAY_CONFIG, or defaults plus
//! environment overrides), connects to the counting store, and runs the
//! HTTP server until interrupted.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_gateway::config::{self, loader};
use api_gateway::ratelimit::RedisWindowStore;
use api_gateway::GatewayServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("GATEWAY_CONFIG") {
        Ok(path) => config::load_config(Path::new(&path))?,
        Err(_) => config::config_from_env()?,
    };

    let default_filter = if config.server.debug {
        "api_gateway=debug,tower_http=debug"
    } else {
        "api_gateway=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    loader::warn_insecure_defaults(&config);

    tracing::info!(
        bind_address = %config.server.bind_address,
        budget_per_second = config.rate_limit.requests_per_second,
        redis_url = %config.store.redis_url,
        "Configuration loaded"
    );

    // The counting store is mandatory: admission fails closed, so there is
    // no point starting without it.
    let store = RedisWindowStore::connect(&config.store.redis_url).await?;
    tracing::info!("Counting store connected");

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = GatewayServer::new(config, Arc::new(store));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
