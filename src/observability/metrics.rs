//! Metrics collection and exposition.
//!
//! # Metrics
//! - `asaas_proxy_requests_total` (counter): requests by method, status, outcome
//! - `asaas_proxy_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder it is a no-op
//! - The Prometheus endpoint is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "asaas_proxy_requests_total";
pub const REQUEST_DURATION: &str = "asaas_proxy_request_duration_seconds";

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(REQUESTS_TOTAL, "Total number of forwarded requests");
            describe_histogram!(REQUEST_DURATION, "Forwarded request duration in seconds");
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one forwarded request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "outcome" => outcome).record(start.elapsed().as_secs_f64());
}
