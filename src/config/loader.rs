//! Configuration loading and validation.
//!
//! # Responsibilities
//! - Parse TOML config files into [`GatewayConfig`]
//! - Apply environment overrides for secrets
//! - Semantic validation (serde handles syntactic)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, DEFAULT_JWT_SECRET};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GatewayConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment overrides.
/// Used when no config file is provided.
pub fn config_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Environment overrides for values that should not live in config files.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(secret) = std::env::var("GATEWAY_JWT_SECRET") {
        if !secret.is_empty() {
            config.auth.jwt_secret = secret;
        }
    }
    if let Ok(url) = std::env::var("GATEWAY_REDIS_URL") {
        if !url.is_empty() {
            config.store.redis_url = url;
        }
    }
}

/// Semantic validation of a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError {
            field: "auth.jwt_secret".into(),
            message: "must not be empty".into(),
        });
    }

    if config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError {
            field: "rate_limit.requests_per_second".into(),
            message: "must be greater than zero".into(),
        });
    }

    if config.store.command_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "store.command_timeout_ms".into(),
            message: "must be greater than zero".into(),
        });
    }

    for (field, value) in [
        ("services.ingestion_url", &config.services.ingestion_url),
        ("services.agent_url", &config.services.agent_url),
        ("services.indexing_url", &config.services.indexing_url),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError {
                field: field.into(),
                message: format!("not a valid URL: {}", e),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Warn about values that are acceptable for development only.
pub fn warn_insecure_defaults(config: &GatewayConfig) {
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("using default JWT secret; set GATEWAY_JWT_SECRET in production");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [server]
            bind_address = "127.0.0.1:9000"

            [auth]
            jwt_secret = "s3cret"

            [rate_limit]
            requests_per_second = 5
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.rate_limit.requests_per_second, 5);
        // Untouched sections keep defaults
        assert_eq!(config.services.ingestion_url, "http://localhost:8001");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_secret_and_zero_budget() {
        let mut config = GatewayConfig::default();
        config.auth.jwt_secret = String::new();
        config.rate_limit.requests_per_second = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"auth.jwt_secret"));
        assert!(fields.contains(&"rate_limit.requests_per_second"));
    }

    #[test]
    fn test_validation_rejects_malformed_service_url() {
        let mut config = GatewayConfig::default();
        config.services.agent_url = "not a url".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "services.agent_url");
    }
}
