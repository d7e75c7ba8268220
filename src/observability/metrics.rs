//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fetch_requests_total` (counter): finished logical requests by outcome
//! - `fetch_attempts_total` (counter): transport attempts by status class
//! - `fetch_request_duration_seconds` (histogram): per-attempt latency
//! - `fetch_cache_hits_total` (counter)
//! - `fetch_rate_limited_total` (counter)
//! - `fetch_circuit_rejections_total` (counter)
//! - `fetch_circuit_opened_total` (counter)
//! - `fetch_retries_total` (counter)
//! - `fetch_cache_entries` (gauge)
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus scrape endpoint. Needs a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("fetch_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_attempt(status: Option<u16>, elapsed: Duration) {
    let class = match status {
        Some(s) if s < 300 => "2xx",
        Some(s) if s < 400 => "3xx",
        Some(s) if s < 500 => "4xx",
        Some(_) => "5xx",
        None => "transport_error",
    };
    counter!("fetch_attempts_total", "status" => class).increment(1);
    histogram!("fetch_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_cache_hit() {
    counter!("fetch_cache_hits_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("fetch_cache_entries").set(entries as f64);
}

pub fn record_rate_limited() {
    counter!("fetch_rate_limited_total").increment(1);
}

pub fn record_circuit_rejection() {
    counter!("fetch_circuit_rejections_total").increment(1);
}

pub fn record_circuit_opened() {
    counter!("fetch_circuit_opened_total").increment(1);
}

pub fn record_retry() {
    counter!("fetch_retries_total").increment(1);
}
