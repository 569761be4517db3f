//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → env overrides (secrets)
//!     → semantic validation
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment, never committed to files

pub mod loader;
pub mod schema;

pub use loader::{config_from_env, load_config, ConfigError};
pub use schema::{
    AuthConfig, CorsConfig, GatewayConfig, RateLimitConfig, ServerConfig, ServiceConfig,
    StoreConfig,
};
