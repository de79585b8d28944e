//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_reload_checks_total` (counter): reload checks by outcome
//!   (`changed`, `unchanged`, `pending`, `error`)
//! - `config_reload_events_total` (counter): reload events fired
//! - `config_builder_events_total` (counter): builder events by type
//! - `config_builder_failures_total` (counter): failed constructions

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reload_check(outcome: &'static str) {
    metrics::counter!("config_reload_checks_total", "outcome" => outcome).increment(1);
}

pub fn record_reload_event() {
    metrics::counter!("config_reload_events_total").increment(1);
}

pub fn record_builder_event(event: &'static str) {
    metrics::counter!("config_builder_events_total", "event" => event).increment(1);
}

pub fn record_builder_failure() {
    metrics::counter!("config_builder_failures_total").increment(1);
}
