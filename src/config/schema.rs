//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Fallback backend address used outside production.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment (drives cookie security and diagnostics).
    pub environment: Environment,

    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// External backend the proxy routes forward to.
    pub upstream: UpstreamConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening.
    pub security: SecurityConfig,
}

impl GatewayConfig {
    /// Backend base URL after applying the environment default.
    ///
    /// Production has no default; validation rejects a missing URL there.
    pub fn backend_url(&self) -> &str {
        self.upstream
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    /// Whether issued cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.session
            .secure
            .unwrap_or(self.environment == Environment::Production)
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend base URL. Falls back to `DEFAULT_BACKEND_URL` in development.
    pub base_url: Option<String>,

    /// Total time allowed for one upstream call in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Honor HTTP(S)_PROXY environment variables for backend calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
            use_system_proxy: true,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the HTTP-only cookie holding the backend JWT.
    pub cookie_name: String,

    /// Cookie lifetime on issuance, in seconds.
    pub max_age_secs: u64,

    /// Force the `Secure` attribute on or off (default: on in production).
    pub secure: Option<bool>,

    /// Where the OAuth callback sends the browser when no token arrived.
    pub login_path: String,

    /// Where the OAuth callback sends the browser after storing the token.
    pub post_login_redirect: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "app_jwt".to_string(),
            max_age_secs: 60 * 60 * 24 * 7,
            secure: None,
            login_path: "/login".to_string(),
            post_login_redirect: "/drive".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add `nosniff` and `no-store` headers to every response.
    pub enable_headers: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = GatewayConfig::default();
        assert_eq!(config.backend_url(), "http://localhost:8000");
        assert_eq!(config.session.cookie_name, "app_jwt");
        assert_eq!(config.session.max_age_secs, 604_800);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_production_defaults_to_secure_cookies() {
        let mut config = GatewayConfig::default();
        config.environment = Environment::Production;
        assert!(config.secure_cookies());

        config.session.secure = Some(false);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            environment = "production"

            [upstream]
            base_url = "https://api.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.backend_url(), "https://api.example.com");
        assert_eq!(config.upstream.request_timeout_secs, 30);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("Development".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }
}
