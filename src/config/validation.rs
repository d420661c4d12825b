//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend URL is usable for the selected environment
//! - Validate value ranges (timeouts > 0, cookie lifetime > 0)
//! - Check the cookie name and redirect paths are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{Environment, GatewayConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    validate_upstream(config, &mut errors);
    validate_session(config, &mut errors);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    if config.environment == Environment::Production && config.upstream.base_url.is_none() {
        errors.push(ValidationError::new(
            "upstream.base_url",
            "must be set explicitly in production",
        ));
    }

    match Url::parse(config.backend_url()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.cannot_be_a_base() || url.host_str().is_none() {
                errors.push(ValidationError::new("upstream.base_url", "must include a host"));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::new(
                    "upstream.base_url",
                    "must not carry a query or fragment",
                ));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("'{}' is not a URL: {}", config.backend_url(), e),
        )),
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.connect_timeout_secs",
            "must be greater than 0",
        ));
    }
}

fn validate_session(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let name = &config.session.cookie_name;
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        errors.push(ValidationError::new(
            "session.cookie_name",
            format!("'{}' is not a valid cookie name", name),
        ));
    }

    if config.session.max_age_secs == 0 || config.session.max_age_secs > i64::MAX as u64 {
        errors.push(ValidationError::new(
            "session.max_age_secs",
            "must be a positive number of seconds",
        ));
    }

    for (field, path) in [
        ("session.login_path", &config.session.login_path),
        ("session.post_login_redirect", &config.session.post_login_redirect),
    ] {
        // Same-origin only; "//host" would be protocol-relative.
        if !path.starts_with('/') || path.starts_with("//") {
            errors.push(ValidationError::new(
                field,
                format!("'{}' must be an absolute same-origin path", path),
            ));
        }
    }
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
