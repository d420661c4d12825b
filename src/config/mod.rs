//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply APP_ENV / BACKEND_URL / BIND_ADDRESS)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via ArcSwap to every request
//!
//! On file change:
//!     watcher.rs sees an event for the file in its directory
//!     → waits for the writes to settle, skips empty or unchanged content
//!     → loader.rs parses the new config
//!     → validation.rs validates
//!     → atomic swap of the gateway state
//! ```
//!
//! # Design Decisions
//! - One backend URL resolution rule for every route
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, parse_config, ConfigError};
pub use schema::{
    Environment, GatewayConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
    SessionConfig, TlsConfig, UpstreamConfig,
};
