//! The forwarding operation shared by every proxy route.
//!
//! `ProxyRequest` is an extractor: taking it as a handler argument reads the
//! session cookie and captures the request ID and raw query. Handlers then
//! add path parameters and the body and call [`ProxyRequest::send`], which
//! applies the auth gate before anything else.

use std::convert::Infallible;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::Response,
};

use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::response::{ProxyOutcome, SessionDirective};
use crate::http::server::{AppState, GatewayState};
use crate::observability::metrics;
use crate::proxy::route::ProxyRoute;
use crate::proxy::translator::translate;
use crate::proxy::upstream::UpstreamRequest;
use crate::session::gate::{MissingSession, SessionCredential};

/// An authenticated request on its way to the backend.
#[derive(Debug)]
pub struct ProxyRequest {
    credential: Result<SessionCredential, MissingSession>,
    request_id: String,
    raw_query: Option<String>,
    segments: Vec<String>,
    body: Option<Result<Bytes, BytesRejection>>,
}

impl FromRequestParts<AppState> for ProxyRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credential = SessionCredential::from_request_parts(parts, state).await;
        Ok(Self {
            credential,
            request_id: request_id(&parts.headers).to_owned(),
            raw_query: parts.uri.query().map(str::to_owned),
            segments: Vec::new(),
            body: None,
        })
    }
}

impl ProxyRequest {
    /// Append a path parameter to the backend path.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn body(mut self, body: Result<Bytes, BytesRejection>) -> Self {
        self.body = Some(body);
        self
    }

    /// Run forward → translate against the current gateway state.
    ///
    /// Never fails: local errors become the generic 500 envelope.
    pub async fn send(self, state: &AppState, route: &'static ProxyRoute) -> Response {
        let started = Instant::now();
        let gateway = state.load();

        tracing::debug!(
            request_id = %self.request_id,
            route = route.name,
            method = %route.method,
            "Proxying request"
        );

        let request_id = self.request_id.clone();
        let outcome = match self.execute(&gateway, route).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(request_id = %request_id, route = route.name, error = %e, "Proxy route failed");
                e.to_outcome()
            }
        };

        if outcome.session == SessionDirective::Clear {
            metrics::record_session_cleared(route.name);
        }
        metrics::record_request(route.name, outcome.status.as_u16(), started);

        outcome.respond(&gateway.cookies)
    }

    async fn execute(self, gateway: &GatewayState, route: &'static ProxyRoute) -> Result<ProxyOutcome, GatewayError> {
        let credential = match &self.credential {
            Ok(credential) => credential,
            Err(missing) => return Ok(missing.outcome()),
        };

        let raw_body = match self.body {
            Some(Ok(bytes)) => Some(bytes),
            Some(Err(rejection)) => {
                tracing::warn!(request_id = %self.request_id, route = route.name, error = %rejection, "Request body rejected");
                return Ok(ProxyOutcome::error(rejection.status(), rejection.body_text()));
            }
            None => None,
        };

        let body = match route.body.prepare(raw_body.as_deref()) {
            Ok(body) => body,
            Err(rejection) => {
                tracing::debug!(request_id = %self.request_id, route = route.name, reason = ?rejection, "Request body invalid");
                return Ok(ProxyOutcome::error(StatusCode::BAD_REQUEST, rejection.message()));
            }
        };

        let mut url = gateway.upstream.endpoint(route.upstream_path, &self.segments)?;
        route.query.apply(&mut url, self.raw_query.as_deref());

        let reply = gateway
            .upstream
            .send(UpstreamRequest {
                method: route.method.clone(),
                url,
                credential,
                request_id: &self.request_id,
                body,
            })
            .await?;

        tracing::debug!(
            request_id = %self.request_id,
            route = route.name,
            upstream_status = reply.status.as_u16(),
            "Backend responded"
        );
        metrics::record_upstream_status(route.name, reply.status.as_u16());

        translate(route, reply)
    }
}
