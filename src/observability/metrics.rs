//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_decisions_total` (counter): decisions by route, conclusion, reason
//! - `gateway_engine_failures_total` (counter): failed engine calls by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: String, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_decision(route: &'static str, conclusion: &'static str, reason: &'static str) {
    counter!(
        "gateway_decisions_total",
        "route" => route,
        "conclusion" => conclusion,
        "reason" => reason
    )
    .increment(1);
}

pub fn record_engine_failure(kind: &'static str) {
    counter!("gateway_engine_failures_total", "kind" => kind).increment(1);
}
