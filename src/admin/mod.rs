//! Operational endpoints: health and development diagnostics.

pub mod guard;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::guard::development_only;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    let dev = Router::new()
        .route("/api/_dev", get(get_dev_environment))
        .layer(middleware::from_fn_with_state(state, development_only));

    Router::new().route("/healthz", get(get_status)).merge(dev)
}
