use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Environment;
use crate::http::response::ProxyOutcome;
use crate::http::server::AppState;

pub const DEVELOPMENT_ONLY_MESSAGE: &str = "This endpoint is only available in development mode";

/// Answers 403 for every request while running in production.
pub async fn development_only(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let environment = state.load().config.environment;
    if environment == Environment::Production {
        tracing::warn!(path = %request.uri().path(), "Diagnostics requested in production");
        return ProxyOutcome::error(StatusCode::FORBIDDEN, DEVELOPMENT_ONLY_MESSAGE).into_response();
    }

    next.run(request).await
}
