//! Metrics collection.
//!
//! # Metrics
//! - `mock_responses_total` (counter): constructed responses by status
//! - `mock_response_duration_seconds` (histogram): construction time, latency included
//! - `mock_proxy_failover_total` (counter): failover content served
//! - `mock_construction_failures_total` (counter): failed constructions by kind
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! these calls are no-ops.

use tokio::time::Instant;

pub fn record_response(status: u16, start: Instant) {
    metrics::counter!("mock_responses_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("mock_response_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_proxy_failover() {
    metrics::counter!("mock_proxy_failover_total").increment(1);
}

pub fn record_construction_failure(kind: &'static str) {
    metrics::counter!("mock_construction_failures_total", "kind" => kind).increment(1);
}
