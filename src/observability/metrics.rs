//! Metrics collection.
//!
//! # Metrics
//! - `auth0_api_requests_total` (counter): completed calls by method, status
//! - `auth0_api_request_duration_seconds` (histogram): latency by method
//! - `auth0_api_retries_total` (counter): retried attempts by method, reason
//! - `auth0_patch_stage_total` (counter): sequencer stages by group, result
//!
//! The library only records through the `metrics` facade; installing an
//! exporter is left to the embedding process.

use std::time::Instant;

use metrics::{counter, histogram};

/// Record a call that produced an HTTP response.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "auth0_api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("auth0_api_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a call that never produced a response.
pub fn record_transport_failure(method: &str) {
    counter!(
        "auth0_api_requests_total",
        "method" => method.to_string(),
        "status" => "transport_error"
    )
    .increment(1);
}

/// Record a retry decision.
pub fn record_retry(method: &str, reason: &'static str) {
    counter!(
        "auth0_api_retries_total",
        "method" => method.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record the outcome of one patch stage.
pub fn record_patch_stage(group: &'static str, ok: bool) {
    counter!(
        "auth0_patch_stage_total",
        "group" => group,
        "result" => if ok { "applied" } else { "failed" }
    )
    .increment(1);
}
