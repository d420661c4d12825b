//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with every gateway route
//! - Wire up middleware (tracing, request ID, body limit, security headers)
//! - Hold the hot-swappable gateway state
//! - Serve plain HTTP or TLS until shutdown
//!
//! # Design Decisions
//! - Per-request state (config, upstream client, cookie codec) lives behind
//!   `ArcSwap`; a request keeps the generation it started with
//! - Listener-level settings (bind address, TLS, layers) apply at startup only

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{CACHE_CONTROL, X_CONTENT_TYPE_OPTIONS},
        HeaderValue,
    },
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::admin;
use crate::config::{GatewayConfig, TlsConfig};
use crate::error::GatewayError;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::net::tls::load_tls_config;
use crate::proxy::routes;
use crate::proxy::UpstreamClient;
use crate::session::handlers as session;
use crate::session::SessionCookies;

/// How long TLS connections get to finish after shutdown is triggered.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a request needs, built from one configuration generation.
#[derive(Debug)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub upstream: UpstreamClient,
    pub cookies: SessionCookies,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let upstream = UpstreamClient::new(&config)?;
        let cookies = SessionCookies::from_config(&config)?;
        Ok(Self {
            config,
            upstream,
            cookies,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<GatewayState>>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let state = GatewayState::new(config)?;
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(state)),
        })
    }

    /// The current generation.
    pub fn load(&self) -> Arc<GatewayState> {
        self.inner.load_full()
    }

    /// Swap in a new generation. The old one stays alive for in-flight requests.
    pub fn reload(&self, config: GatewayConfig) -> Result<(), GatewayError> {
        let state = GatewayState::new(config)?;
        tracing::info!(
            backend_url = %state.upstream.base_url(),
            environment = state.config.environment.as_str(),
            "Gateway configuration reloaded"
        );
        self.inner.store(Arc::new(state));
        Ok(())
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    tls: Option<TlsConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let state = AppState::new(config.clone())?;
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            tls: config.listener.tls,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            // Local session routes
            .route("/api/auth/store-session", post(session::store_session))
            .route("/api/auth/logout", get(session::logout).post(session::logout))
            .route("/auth/login", get(session::login))
            .route("/auth/callback", get(session::callback))
            // Backend proxy routes
            .route("/api/auth/refresh", post(routes::refresh_token))
            .route(
                "/api/calendar/events",
                get(routes::list_calendar_events).post(routes::create_calendar_event),
            )
            .route("/api/drive", get(routes::list_drive).post(routes::create_drive_doc))
            .route("/api/mail/labels", get(routes::list_labels))
            .route("/api/mail/messages", get(routes::list_messages))
            .route("/api/mail/messages/{message_id}", get(routes::get_message))
            .route("/api/mail/threads", get(routes::list_threads))
            .route("/api/mail/threads/{thread_id}", get(routes::get_thread))
            .route("/api/mail/drafts", post(routes::create_draft))
            .route("/api/mail/drafts/reply", post(routes::create_reply_draft))
            .route("/api/mail/drafts/create_blank", post(routes::create_blank_draft))
            .route("/api/todos", get(routes::list_todos).post(routes::create_todo))
            // Legacy per-method paths
            .route("/api/todos/GET", get(routes::list_todos))
            .route("/api/todos/POST", post(routes::create_todo))
            .merge(admin::setup_admin_router(state.clone()))
            .fallback(admin::handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size));

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::overriding(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ));
        }

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations arriving on `config_updates` are swapped in for
    /// subsequent requests.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        tokio::spawn(apply_config_updates(
            self.state.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        match self.tls {
            Some(tls) => {
                let rustls = load_tls_config(&tls).await?;
                let handle = axum_server::Handle::new();

                let drain = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
                });

                tracing::info!(address = %addr, "HTTPS server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, "HTTP server starting");
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        tracing::info!("Shutdown signal received, draining connections");
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving or driving in tests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn apply_config_updates(
    state: AppState,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                if let Err(e) = state.reload(config) {
                    tracing::error!(error = %e, "Rejected configuration update, keeping current state");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}
