//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, client status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_upstream_responses_total` (counter): backend answers by route, status
//! - `gateway_session_cleared_total` (counter): cookies cleared after a backend 401

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(route: &'static str, status: u16, started: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds", "route" => route)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_upstream_status(route: &'static str, status: u16) {
    ::metrics::counter!(
        "gateway_upstream_responses_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_session_cleared(route: &'static str) {
    ::metrics::counter!("gateway_session_cleared_total", "route" => route).increment(1);
}
