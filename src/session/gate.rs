//! Auth gate: the session credential extractor.
//!
//! Proxy handlers take a [`SessionCredential`] argument; axum runs this
//! extractor before the handler body, so a request without the session
//! cookie is answered with 401 before anything is sent upstream.

use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::ProxyOutcome;
use crate::http::server::AppState;

/// Body `error` for requests that arrive without a session cookie.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required. Please login.";

/// The opaque backend token carried by the session cookie.
///
/// Validity is decided by the backend alone; the gateway never inspects it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}

/// Rejection returned when no session cookie is present.
#[derive(Debug)]
pub struct MissingSession;

impl MissingSession {
    pub fn outcome(&self) -> ProxyOutcome {
        ProxyOutcome::error(StatusCode::UNAUTHORIZED, AUTH_REQUIRED_MESSAGE)
    }
}

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        self.outcome().into_response()
    }
}

impl FromRequestParts<AppState> for SessionCredential {
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let gateway = state.load();
        match gateway.cookies.read(&parts.headers) {
            Some(token) => Ok(SessionCredential::new(token)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "Rejecting request without session cookie");
                Err(MissingSession)
            }
        }
    }
}
