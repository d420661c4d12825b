use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::http::response::ProxyOutcome;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DevEnvironment {
    pub message: &'static str,
    pub environment: EnvironmentSummary,
}

/// Non-secret settings the gateway is running with.
#[derive(Debug, Serialize)]
pub struct EnvironmentSummary {
    pub backend_url: String,
    pub environment: &'static str,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_dev_environment(State(state): State<AppState>) -> Json<DevEnvironment> {
    let gateway = state.load();
    Json(DevEnvironment {
        message: "Development environment variables",
        environment: EnvironmentSummary {
            backend_url: gateway.upstream.base_url().to_string(),
            environment: gateway.config.environment.as_str(),
            cookie_name: gateway.cookies.name().to_string(),
            secure_cookie: gateway.cookies.is_secure(),
        },
    })
}

pub async fn not_found() -> impl IntoResponse {
    ProxyOutcome::error(StatusCode::NOT_FOUND, "Not found")
}
