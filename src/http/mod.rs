//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, state)
//!     → request.rs (request ID)
//!     → session / proxy / admin handlers
//!     → response.rs (envelope + Set-Cookie)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ProxyOutcome, SessionDirective};
pub use server::{AppState, GatewayState, HttpServer};
