//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route template, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `auth_rejections_total` (counter): authorization failures by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start_time: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    let status = status.to_string();

    ::metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.clone()
    )
    .increment(1);
    ::metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "route" => route,
        "status" => status
    )
    .record(start_time.elapsed().as_secs_f64());
}

pub fn record_auth_rejection(reason: &'static str) {
    ::metrics::counter!("auth_rejections_total", "reason" => reason).increment(1);
}
