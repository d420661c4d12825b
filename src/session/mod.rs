//! Session credential handling.
//!
//! # Data Flow
//! ```text
//! Browser cookie
//!     → cookie.rs (parse / render Set-Cookie)
//!     → gate.rs (SessionCredential extractor, 401 when absent)
//!     → proxy routes (bearer credential upstream)
//!
//! handlers.rs: store-session, logout, OAuth login + callback
//! ```
//!
//! # Design Decisions
//! - The credential is opaque; only the backend decides whether it is valid
//! - The cookie is HTTP-only so page scripts never see the token

pub mod cookie;
pub mod gate;
pub mod handlers;

pub use cookie::{CookieError, SessionCookies};
pub use gate::{MissingSession, SessionCredential};
