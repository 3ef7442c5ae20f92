//! Metrics collection and exposition.
//!
//! # Metrics
//! - `import_attempts_total` (counter): attempts by outcome (success, failure)
//! - `import_items_total` (counter): terminal items by outcome (imported, failed, rejected)
//! - `import_retry_delay_ms` (histogram): backoff delays actually slept
//! - `import_batch_duration_seconds` (histogram): wall time per batch
//!
//! Without an installed recorder every call is a no-op, so library users
//! that never call [`init_metrics`] pay nothing.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_attempt(outcome: &'static str) {
    metrics::counter!("import_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_item(outcome: &'static str) {
    metrics::counter!("import_items_total", "outcome" => outcome).increment(1);
}

pub fn record_retry_delay(delay: Duration) {
    metrics::histogram!("import_retry_delay_ms").record(delay.as_millis() as f64);
}

pub fn record_batch(started: Instant) {
    metrics::histogram!("import_batch_duration_seconds").record(started.elapsed().as_secs_f64());
}
