use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Login prompt for a 401 that carries no server message.
pub const LOGIN_PROMPT: &str = "Please login to view this page.";

/// What a dashboard page shows for one gateway call.
///
/// ```text
/// Loading ─2xx──────────→ Authenticated(data)
///         ─401──────────→ Unauthenticated
///         ─other status─→ Error(server message | "Error: <status>")
///         ─no response──→ Error(transport message)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Authenticated(Value),
    Unauthenticated { message: String },
    Error(String),
}

impl ViewState {
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let json: Option<Value> = serde_json::from_slice(body).ok();

        if status.is_success() {
            return ViewState::Authenticated(json.unwrap_or(Value::Null));
        }

        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(json.as_ref()).unwrap_or(LOGIN_PROMPT).to_string();
            return ViewState::Unauthenticated { message };
        }

        match error_message(json.as_ref()) {
            Some(message) => ViewState::Error(message.to_string()),
            None => ViewState::Error(format!("Error: {}", status.as_u16())),
        }
    }

    pub fn from_transport_error(error: &reqwest::Error) -> Self {
        ViewState::Error(format!("Could not reach the gateway: {}", error))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, ViewState::Authenticated(_))
    }

    /// The page should show its login prompt.
    pub fn needs_login(&self) -> bool {
        matches!(self, ViewState::Unauthenticated { .. })
    }
}

fn error_message(json: Option<&Value>) -> Option<&str> {
    json?.get("error")?.as_str().filter(|m| !m.is_empty())
}
