//! Response translator.
//!
//! Maps the backend's status and payload onto the client contract:
//!
//! | Backend            | Client                                              |
//! |--------------------|-----------------------------------------------------|
//! | 2xx + JSON         | same status, same bytes                             |
//! | 2xx + other        | 502                                                 |
//! | 3xx                | 401, `redirectToBackendAuth: true`                  |
//! | 400                | 400 with the backend `detail`                       |
//! | 401                | 401, session cookie cleared                         |
//! | 403                | 403 with the route's permission message             |
//! | anything else      | same status, `detail` or body cut to 100 chars      |

use axum::http::StatusCode;
use serde::de::IgnoredAny;
use serde_json::json;

use crate::error::GatewayError;
use crate::http::response::ProxyOutcome;
use crate::proxy::route::ProxyRoute;
use crate::proxy::upstream::UpstreamReply;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired or invalid. Please login again.";
pub const NON_JSON_MESSAGE: &str = "Received unexpected non-JSON response from backend";
pub const REDIRECT_MESSAGE: &str = "Authentication required. Redirecting to login...";

/// Longest backend excerpt echoed to the browser.
pub const EXCERPT_CHARS: usize = 100;
/// Longest backend body written to the log for unexpected 2xx payloads.
const LOG_CHARS: usize = 500;

pub fn translate(route: &ProxyRoute, reply: UpstreamReply) -> Result<ProxyOutcome, GatewayError> {
    let status = reply.status;

    if status.is_success() {
        if !reply.is_json() {
            tracing::error!(
                route = route.name,
                status = status.as_u16(),
                content_type = reply.content_type.as_deref().unwrap_or("none"),
                body = %truncate(&reply.text(), LOG_CHARS),
                "Backend returned a non-JSON success response"
            );
            return Ok(ProxyOutcome::error(StatusCode::BAD_GATEWAY, NON_JSON_MESSAGE));
        }

        serde_json::from_slice::<IgnoredAny>(&reply.body)?;
        return Ok(ProxyOutcome::relay(status, reply.body));
    }

    let outcome = match status {
        StatusCode::UNAUTHORIZED => {
            tracing::info!(route = route.name, "Backend rejected session credential");
            ProxyOutcome::error(status, SESSION_EXPIRED_MESSAGE).clear_session()
        }
        StatusCode::FORBIDDEN => ProxyOutcome::error(status, route.messages.forbidden),
        StatusCode::BAD_REQUEST => {
            let message = reply
                .detail()
                .unwrap_or_else(|| route.messages.bad_request.to_string());
            ProxyOutcome::error(status, message)
        }
        s if s.is_redirection() => {
            tracing::info!(route = route.name, status = s.as_u16(), "Backend redirected to its login flow");
            ProxyOutcome::json(
                StatusCode::UNAUTHORIZED,
                json!({ "error": REDIRECT_MESSAGE, "redirectToBackendAuth": true }),
            )
        }
        s => {
            let text = reply.text();
            tracing::error!(route = route.name, status = s.as_u16(), body = %text, "Backend error");
            let excerpt = reply.detail().unwrap_or_else(|| text.into_owned());
            ProxyOutcome::error(
                s,
                format!(
                    "Backend error {}: {} - {}",
                    route.messages.context,
                    s.as_u16(),
                    truncate(&excerpt, EXCERPT_CHARS)
                ),
            )
        }
    };

    Ok(outcome)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{Payload, SessionDirective};
    use crate::proxy::routes::{CALENDAR_EVENTS_CREATE, CALENDAR_EVENTS_LIST, MAIL_LABELS};
    use axum::body::Bytes;
    use serde_json::Value;

    fn reply(status: u16, content_type: Option<&str>, body: &str) -> UpstreamReply {
        UpstreamReply {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: content_type.map(str::to_owned),
            body: Bytes::from(body.to_owned()),
        }
    }

    fn error_text(outcome: &ProxyOutcome) -> &str {
        outcome.envelope().unwrap()["error"].as_str().unwrap()
    }

    #[test]
    fn test_success_json_is_relayed_verbatim() {
        let body = r#"{"events":[{"id":"e1","summary":"Standup"}]}"#;
        let outcome = translate(&CALENDAR_EVENTS_LIST, reply(200, Some("application/json"), body)).unwrap();

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.payload, Payload::Relay(Bytes::from(body)));
        assert_eq!(outcome.session, SessionDirective::Keep);
    }

    #[test]
    fn test_success_keeps_created_status() {
        let outcome = translate(&MAIL_LABELS, reply(201, Some("application/json"), "{}")).unwrap();
        assert_eq!(outcome.status, StatusCode::CREATED);
    }

    #[test]
    fn test_success_without_json_is_bad_gateway() {
        let outcome = translate(&MAIL_LABELS, reply(200, Some("text/html"), "<html></html>")).unwrap();
        assert_eq!(outcome.status, StatusCode::BAD_GATEWAY);
        assert_eq!(error_text(&outcome), NON_JSON_MESSAGE);
    }

    #[test]
    fn test_malformed_json_is_local_error() {
        let result = translate(&MAIL_LABELS, reply(200, Some("application/json"), "{oops"));
        assert!(matches!(result, Err(GatewayError::InvalidUpstreamJson(_))));
    }

    #[test]
    fn test_unauthorized_clears_session() {
        let outcome = translate(&MAIL_LABELS, reply(401, Some("application/json"), r#"{"detail":"expired"}"#)).unwrap();
        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
        assert_eq!(outcome.session, SessionDirective::Clear);
        assert_eq!(error_text(&outcome), SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_forbidden_keeps_session() {
        let outcome = translate(&MAIL_LABELS, reply(403, Some("application/json"), "{}")).unwrap();
        assert_eq!(outcome.status, StatusCode::FORBIDDEN);
        assert_eq!(outcome.session, SessionDirective::Keep);
        assert_eq!(error_text(&outcome), MAIL_LABELS.messages.forbidden);
    }

    #[test]
    fn test_bad_request_forwards_detail() {
        let outcome = translate(
            &MAIL_LABELS,
            reply(400, Some("application/json"), r#"{"detail":"Both start and end must use either dateTime or date."}"#),
        )
        .unwrap();
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_text(&outcome), "Both start and end must use either dateTime or date.");

        let outcome = translate(&MAIL_LABELS, reply(400, None, "")).unwrap();
        assert_eq!(error_text(&outcome), MAIL_LABELS.messages.bad_request);
    }

    #[test]
    fn test_bad_request_without_detail_uses_route_wording() {
        let outcome = translate(&CALENDAR_EVENTS_CREATE, reply(400, Some("application/json"), "{}")).unwrap();
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_text(&outcome), "Invalid event data provided.");
    }

    #[test]
    fn test_redirect_means_backend_login() {
        let outcome = translate(&MAIL_LABELS, reply(307, None, "")).unwrap();
        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
        assert_eq!(outcome.session, SessionDirective::Keep);
        let envelope = outcome.envelope().unwrap();
        assert_eq!(envelope["redirectToBackendAuth"], Value::Bool(true));
    }

    #[test]
    fn test_other_errors_are_truncated() {
        let long = "x".repeat(300);
        let outcome = translate(&MAIL_LABELS, reply(500, Some("text/plain"), &long)).unwrap();

        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = error_text(&outcome);
        let prefix = format!("Backend error {}: 500 - ", MAIL_LABELS.messages.context);
        assert!(message.starts_with(&prefix));
        assert_eq!(message.len() - prefix.len(), EXCERPT_CHARS);
    }

    #[test]
    fn test_other_errors_prefer_detail() {
        let outcome = translate(&MAIL_LABELS, reply(404, Some("application/json"), r#"{"detail":"Label not found"}"#)).unwrap();
        assert_eq!(outcome.status, StatusCode::NOT_FOUND);
        assert!(error_text(&outcome).ends_with("404 - Label not found"));
    }
}
