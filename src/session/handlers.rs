//! Local session routes: nothing here talks to the backend.
//!
//! - `POST /api/auth/store-session` stores a token handed over by the browser
//! - `GET|POST /api/auth/logout` clears the cookie
//! - `GET /auth/login` sends the browser to the backend's OAuth entry point
//! - `GET /auth/callback?jwt=..` finishes the OAuth round trip

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::http::response::ProxyOutcome;
use crate::http::server::AppState;
use crate::session::cookie::SessionCookies;

pub const STORED_MESSAGE: &str = "Session token stored successfully";
pub const LOGGED_OUT_MESSAGE: &str = "Logged out successfully";
pub const MISSING_TOKEN_MESSAGE: &str = "JWT not provided";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid session token";

/// Backend path that starts the Google OAuth flow.
const BACKEND_LOGIN_PATH: &str = "/auth/google/login";

pub async fn store_session(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let gateway = state.load();
    store_outcome(body).respond(&gateway.cookies)
}

fn store_outcome(body: Result<Bytes, BytesRejection>) -> ProxyOutcome {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => return ProxyOutcome::error(rejection.status(), rejection.body_text()),
    };

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return ProxyOutcome::error(StatusCode::BAD_REQUEST, "Invalid JSON body"),
    };

    let token = match value.get("jwt").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => token,
        _ => return ProxyOutcome::error(StatusCode::BAD_REQUEST, MISSING_TOKEN_MESSAGE),
    };

    if !SessionCookies::accepts(token) {
        tracing::warn!("Refusing session token with characters not allowed in a cookie");
        return ProxyOutcome::error(StatusCode::BAD_REQUEST, INVALID_TOKEN_MESSAGE);
    }

    tracing::info!("Session token stored");
    ProxyOutcome::message(StatusCode::OK, STORED_MESSAGE).issue_session(token)
}

/// Succeeds whether or not a session existed.
pub async fn logout(State(state): State<AppState>) -> Response {
    let gateway = state.load();
    tracing::info!("Session cleared by logout");
    ProxyOutcome::message(StatusCode::OK, LOGGED_OUT_MESSAGE)
        .clear_session()
        .respond(&gateway.cookies)
}

pub async fn login(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let gateway = state.load();
    let target = gateway.upstream.endpoint(BACKEND_LOGIN_PATH, &[])?;
    tracing::debug!(location = %target, "Redirecting to backend login");
    Ok(Redirect::to(target.as_str()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub jwt: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, GatewayError> {
    let gateway = state.load();
    let session = &gateway.config.session;

    let Some(token) = params.jwt.filter(|t| !t.is_empty()) else {
        tracing::warn!("OAuth callback arrived without a token");
        return Ok(login_error(&session.login_path, "jwt_missing"));
    };

    if !SessionCookies::accepts(&token) {
        tracing::warn!("OAuth callback token cannot be stored as a cookie");
        return Ok(login_error(&session.login_path, "session_store_failed"));
    }

    let cookie = gateway.cookies.issue(&token)?;
    let mut response = Redirect::to(&session.post_login_redirect).into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    tracing::info!(redirect = %session.post_login_redirect, "Session established from OAuth callback");
    Ok(response)
}

fn login_error(login_path: &str, code: &str) -> Response {
    Redirect::to(&format!("{}?error={}", login_path, code)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::SessionDirective;
    use serde_json::json;

    fn outcome(raw: &'static str) -> ProxyOutcome {
        store_outcome(Ok(Bytes::from_static(raw.as_bytes())))
    }

    #[test]
    fn test_store_issues_cookie() {
        let outcome = outcome(r#"{"jwt":"abc"}"#);
        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.session, SessionDirective::Issue("abc".into()));
        assert_eq!(outcome.envelope(), Some(&json!({ "message": STORED_MESSAGE })));
    }

    #[test]
    fn test_store_requires_token() {
        for raw in [r#"{}"#, r#"{"jwt":""}"#, r#"{"jwt":null}"#, r#"{"jwt":42}"#] {
            let outcome = outcome(raw);
            assert_eq!(outcome.status, StatusCode::BAD_REQUEST, "{}", raw);
            assert_eq!(outcome.session, SessionDirective::Keep);
            assert_eq!(outcome.envelope(), Some(&json!({ "error": MISSING_TOKEN_MESSAGE })));
        }
    }

    #[test]
    fn test_store_rejects_invalid_json() {
        let outcome = outcome("jwt=abc");
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome.envelope(), Some(&json!({ "error": "Invalid JSON body" })));
    }

    #[test]
    fn test_store_rejects_unsafe_token() {
        let outcome = outcome(r#"{"jwt":"a b;c"}"#);
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome.session, SessionDirective::Keep);
    }
}
