//! Companion gateway library.
//!
//! A session-aware HTTP gateway in front of the companion backend: it keeps
//! the backend JWT in an HTTP-only cookie, forwards dashboard API calls with
//! that token as a bearer credential and translates the answers for the
//! browser.

pub mod admin;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod session;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
