//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_client_requests_total` (counter): façade calls by client, method, outcome
//! - `http_client_request_duration_seconds` (histogram): façade latency by client
//! - `http_client_retries_total` (counter): retry attempts by client
//! - `http_client_circuit_rejections_total` (counter): calls refused by an open circuit
//! - `http_client_circuit_state` (gauge): 0=closed, 1=open, 2=half-open
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(client: &str, method: &str, outcome: &'static str, start: Instant) {
    counter!(
        "http_client_requests_total",
        "client" => client.to_string(),
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("http_client_request_duration_seconds", "client" => client.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(client: &str) {
    counter!("http_client_retries_total", "client" => client.to_string()).increment(1);
}

pub fn record_circuit_rejection(client: &str) {
    counter!("http_client_circuit_rejections_total", "client" => client.to_string()).increment(1);
}

pub fn record_circuit_state(client: &str, state: u8) {
    gauge!("http_client_circuit_state", "client" => client.to_string()).set(state as f64);
}
