//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Selects the deployment environment.
pub const ENV_APP_ENV: &str = "APP_ENV";
/// Overrides `upstream.base_url`.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Overrides `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {name}: {message}")]
    Env { name: &'static str, message: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate TOML text, applying environment overrides.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    finish(config)
}

/// Build configuration from defaults plus environment overrides only.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    finish(GatewayConfig::default())
}

fn finish(config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply the supported environment variables on top of a parsed config.
///
/// `lookup` abstracts `std::env::var` so overrides can be tested without
/// touching the process environment.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_APP_ENV).filter(|v| !v.trim().is_empty()) {
        config.environment = value.parse().map_err(|message| ConfigError::Env {
            name: ENV_APP_ENV,
            message,
        })?;
    }

    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.upstream.base_url = Some(url.trim().to_string());
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS).filter(|v| !v.trim().is_empty()) {
        config.listener.bind_address = addr.trim().to_string();
    }

    Ok(config)
}
