//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Secret value that must never ship to production.
pub const DEFAULT_JWT_SECRET: &str = "changeme-in-production";

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, debug flag).
    pub server: ServerConfig,

    /// Credential verification settings.
    pub auth: AuthConfig,

    /// Counting-store (Redis) settings.
    pub store: StoreConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// CORS configuration.
    pub cors: CorsConfig,

    /// Downstream service base addresses.
    pub services: ServiceConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Debug mode (more verbose default logging).
    pub debug: bool,

    /// Overall request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            debug: true,
            request_timeout_secs: 30,
        }
    }
}

/// Credential verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret used to verify bearer tokens.
    /// Overridable via the GATEWAY_JWT_SECRET environment variable.
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        }
    }
}

/// Counting-store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection URL.
    /// Overridable via the GATEWAY_REDIS_URL environment variable.
    pub redis_url: String,

    /// Timeout for a single store round trip, in milliseconds.
    /// Kept sub-second so admission checks cannot stall the pipeline.
    pub command_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            command_timeout_ms: 500,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admitted requests per second, per rate key.
    pub requests_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 100,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. A single "*" entry allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Base addresses of the downstream services fronted by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Ingestion service (data ingestion and processing).
    pub ingestion_url: String,

    /// Agent orchestrator (workflow coordination).
    pub agent_url: String,

    /// Indexing service (vector embeddings and search).
    pub indexing_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ingestion_url: "http://localhost:8001".to_string(),
            agent_url: "http://localhost:8002".to_string(),
            indexing_url: "http://localhost:8003".to_string(),
        }
    }
}
