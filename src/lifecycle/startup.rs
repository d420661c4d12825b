//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Start the config watcher and signal listener
//! - Bind the listener and serve until shutdown

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{load_config, load_from_env, watcher::ConfigWatcher, ConfigError, GatewayConfig};
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("gateway state: {0}")]
    Gateway(#[from] GatewayError),
    #[error("config watcher: {0}")]
    Watch(#[from] notify::Error),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration from `config_path`, or from the environment alone.
pub fn load(config_path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match config_path {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let config = load(config_path)?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "companion-gateway starting");
    tracing::info!(
        environment = config.environment.as_str(),
        backend_url = %config.backend_url(),
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server for reloads to keep arriving.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    let outcome = tokio::select! {
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            server_task.await
        }
        // The server stopped on its own (e.g. the TLS files could not be loaded).
        outcome = &mut server_task => outcome,
    };

    match outcome {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task panicked"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
