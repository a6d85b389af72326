//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pipeline_requests_total` (counter): requests by method, status
//! - `pipeline_request_duration_seconds` (histogram): latency by method
//! - `pipeline_sanitized_chunks_total` (counter): body chunks rewritten by the sanitizer
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and runs on its own listener

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "pipeline_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("pipeline_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_sanitized_chunk() {
    counter!("pipeline_sanitized_chunks_total").increment(1);
}
