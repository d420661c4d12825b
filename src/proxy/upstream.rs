//! Upstream forwarder.
//!
//! # Responsibilities
//! - Own the pooled HTTP client for the backend
//! - Build backend URLs from the configured base URL
//! - Issue one request per route invocation with the bearer credential
//!
//! # Design Decisions
//! - Redirects are not followed; the translator decides what they mean
//! - No retries: a failed call surfaces immediately
//! - The whole body is buffered; backend responses are small JSON documents

use std::borrow::Cow;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
};
use serde_json::Value;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::X_REQUEST_ID;
use crate::session::gate::SessionCredential;

/// HTTP client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(config.backend_url())?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::OpaqueBaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.upstream.connect_timeout_secs))
            .user_agent(concat!("companion-gateway/", env!("CARGO_PKG_VERSION")));
        if !config.upstream.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(GatewayError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` + `path` + percent-encoded `segments`.
    pub fn endpoint(&self, path: &str, segments: &[String]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| GatewayError::OpaqueBaseUrl(self.base_url.to_string()))?;
            parts.pop_if_empty();
            parts.extend(path.split('/').filter(|s| !s.is_empty()));
            parts.extend(segments.iter().map(String::as_str));
        }
        Ok(url)
    }

    pub async fn send(&self, request: UpstreamRequest<'_>) -> Result<UpstreamReply, GatewayError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .header(AUTHORIZATION, format!("Bearer {}", request.credential.token()))
            .header(X_REQUEST_ID, request.request_id);

        if let Some(body) = request.body {
            // .json() also sets Content-Type: application/json
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}

/// One outbound call.
#[derive(Debug)]
pub struct UpstreamRequest<'a> {
    pub method: Method,
    pub url: Url,
    pub credential: &'a SessionCredential,
    pub request_id: &'a str,
    pub body: Option<Value>,
}

/// The backend's answer, fully buffered.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamReply {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The `detail` field of a FastAPI-style error body, if any.
    ///
    /// Non-string details (validation error lists) are returned as JSON text.
    pub fn detail(&self) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        match value.get("detail")? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
