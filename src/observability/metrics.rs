//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_source_batches_received_total` (counter): deserialized batches
//! - `http_source_events_received_total` (counter): events in those batches
//! - `http_source_batches_accepted_total` (counter): batches the channel took
//! - `http_source_events_accepted_total` (counter): events the channel took
//! - `http_source_responses_total` (counter): responses by status
//!
//! All metrics carry a `source` label. Without an installed recorder the
//! calls are no-ops.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_batch_received(source: &str, events: u64) {
    counter!("http_source_batches_received_total", "source" => source.to_string()).increment(1);
    counter!("http_source_events_received_total", "source" => source.to_string())
        .increment(events);
}

pub fn record_batch_accepted(source: &str, events: u64) {
    counter!("http_source_batches_accepted_total", "source" => source.to_string()).increment(1);
    counter!("http_source_events_accepted_total", "source" => source.to_string())
        .increment(events);
}

pub fn record_response(source: &str, status: u16) {
    counter!(
        "http_source_responses_total",
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
