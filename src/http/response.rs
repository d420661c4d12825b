//! Response envelope and session side effects.
//!
//! # Responsibilities
//! - Carry the client-facing status and JSON payload of a route
//! - Carry what should happen to the session cookie alongside it
//! - Render both into one HTTP response, in one place
//!
//! # Design Decisions
//! - Successful upstream bodies are relayed as the original bytes
//! - Gateway-generated bodies are `{"error": ...}` / `{"message": ...}` envelopes
//! - Cookie changes are data (`SessionDirective`), applied by `respond`

use axum::{
    body::Bytes,
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::session::cookie::SessionCookies;

/// What to do with the session cookie when answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDirective {
    Keep,
    Clear,
    Issue(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON bytes from the backend, passed through untouched.
    Relay(Bytes),
    /// A JSON value built by the gateway.
    Envelope(Value),
}

/// Result of a route: status, body and session effect.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyOutcome {
    pub status: StatusCode,
    pub payload: Payload,
    pub session: SessionDirective,
}

impl ProxyOutcome {
    pub fn relay(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            payload: Payload::Relay(body),
            session: SessionDirective::Keep,
        }
    }

    pub fn json(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            payload: Payload::Envelope(value),
            session: SessionDirective::Keep,
        }
    }

    /// `{"error": message}`
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    /// `{"message": message}`
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "message": message.into() }))
    }

    pub fn clear_session(mut self) -> Self {
        self.session = SessionDirective::Clear;
        self
    }

    pub fn issue_session(mut self, token: impl Into<String>) -> Self {
        self.session = SessionDirective::Issue(token.into());
        self
    }

    pub fn envelope(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Envelope(value) => Some(value),
            Payload::Relay(_) => None,
        }
    }

    /// Render the outcome, applying its session directive with `cookies`.
    pub fn respond(self, cookies: &SessionCookies) -> Response {
        let cookie = match &self.session {
            SessionDirective::Keep => None,
            SessionDirective::Clear => Some(cookies.clear()),
            SessionDirective::Issue(token) => match cookies.issue(token) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!(error = %e, "Refusing to issue session cookie");
                    return crate::error::GatewayError::Cookie(e).into_response();
                }
            },
        };

        let mut response = self.render();
        if let Some(value) = cookie {
            response.headers_mut().append(SET_COOKIE, value);
        }
        response
    }

    fn render(self) -> Response {
        let mut response = match self.payload {
            Payload::Relay(bytes) => (
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response(),
            Payload::Envelope(value) => Json(value).into_response(),
        };
        *response.status_mut() = self.status;
        response
    }
}

/// Renders status and payload only; use [`ProxyOutcome::respond`] when the
/// outcome may touch the session cookie.
impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> Response {
        if self.session != SessionDirective::Keep {
            tracing::warn!(status = %self.status, "Session directive dropped while rendering response");
        }
        self.render()
    }
}
