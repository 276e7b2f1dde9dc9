//! Metrics for upstream requests and alerting.
//!
//! This module provides metrics for:
//! - HTTP attempt latency and status classes
//! - Retries caused by transient upstream failures
//! - Alerts triggered and notifications sent
//!
//! No exporter is installed by the binary; without a recorder the macros are no-ops.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP attempt latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP attempts counter metric name.
pub const METRIC_HTTP_ATTEMPTS: &str = "http_attempts_total";
/// HTTP retries counter metric name.
pub const METRIC_HTTP_RETRIES: &str = "http_retries_total";
/// Alerts triggered counter metric name.
pub const METRIC_ALERTS_TRIGGERED: &str = "alerts_triggered_total";
/// Notifications sent counter metric name.
pub const METRIC_NOTIFICATIONS_SENT: &str = "notifications_sent_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "Latency of a single upstream HTTP attempt in milliseconds"
    );
    describe_counter!(
        METRIC_HTTP_ATTEMPTS,
        "Total number of upstream HTTP attempts, labelled by status class"
    );
    describe_counter!(
        METRIC_HTTP_RETRIES,
        "Total number of retries after a 429 or 5xx response"
    );
    describe_counter!(
        METRIC_ALERTS_TRIGGERED,
        "Total number of alert rules that fired"
    );
    describe_counter!(
        METRIC_NOTIFICATIONS_SENT,
        "Total number of notifications delivered"
    );

    debug!("Metrics initialized");
}

/// Status class label ("2xx", "4xx", ...).
fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Record one HTTP attempt and its latency.
pub fn record_http_attempt(start: Instant, status: u16) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY).record(latency_ms);
    counter!(METRIC_HTTP_ATTEMPTS, "status" => status_class(status)).increment(1);
}

/// Record a retry.
pub fn record_http_retry() {
    counter!(METRIC_HTTP_RETRIES).increment(1);
}

/// Record alerts triggered in a run.
pub fn record_alerts_triggered(count: usize) {
    counter!(METRIC_ALERTS_TRIGGERED).increment(count as u64);
}

/// Record a delivered notification.
pub fn record_notification_sent() {
    counter!(METRIC_NOTIFICATIONS_SENT).increment(1);
}
