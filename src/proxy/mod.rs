//! Backend proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → session::gate (cookie → SessionCredential, or 401)
//!     → route.rs (body rule, query policy)
//!     → upstream.rs (bearer call to the backend)
//!     → translator.rs (status mapping → ProxyOutcome)
//!     → http::response (render + cookie directive)
//! ```
//!
//! # Design Decisions
//! - One forwarding operation; routes differ only by their descriptor
//! - Local failures are caught in `forward.rs` and shown as a generic 500

pub mod forward;
pub mod route;
pub mod routes;
pub mod translator;
pub mod upstream;

pub use forward::ProxyRequest;
pub use route::ProxyRoute;
pub use upstream::UpstreamClient;
