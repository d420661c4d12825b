//! Gateway error type and the route-boundary error sink.
//!
//! Anything that goes wrong locally while serving a proxy route (transport
//! failure, a JSON body that does not parse, a bad backend URL) ends up here
//! and is rendered as a generic 500 envelope. Details are only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::ProxyOutcome;
use crate::session::cookie::CookieError;

/// Client-facing message for every local failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error in API route";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned malformed JSON: {0}")]
    InvalidUpstreamJson(#[from] serde_json::Error),

    #[error("invalid backend URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("backend URL '{0}' cannot carry path segments")]
    OpaqueBaseUrl(String),

    #[error("session cookie: {0}")]
    Cookie(#[from] CookieError),

    #[error("failed to build upstream client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl GatewayError {
    /// The envelope shown to the browser. Never includes `self`'s details.
    pub fn to_outcome(&self) -> ProxyOutcome {
        ProxyOutcome::error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        self.to_outcome().into_response()
    }
}
