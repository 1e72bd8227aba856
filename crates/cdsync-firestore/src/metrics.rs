//! Firestore metrics collection.
//!
//! - Request counters by operation and status
//! - Latency histograms
//! - Connection initialization attempts by outcome

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total Firestore requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "firestore_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "firestore_latency_seconds";

    /// Connection initialization attempts by outcome.
    pub const INIT_ATTEMPTS_TOTAL: &str = "firestore_init_attempts_total";
}

/// Outcome label values for [`record_init_attempt`].
pub mod outcome {
    pub const CONNECTED: &str = "connected";
    pub const RETRY: &str = "retry";
    pub const FAILED: &str = "failed";
}

/// Record metrics for a completed Firestore request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record the outcome of one connection initialization attempt.
pub fn record_init_attempt(outcome: &'static str) {
    counter!(names::INIT_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}
