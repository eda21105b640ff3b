//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, outcome
//! - `gateway_request_duration_seconds` (histogram): latency by method, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - `outcome` is `forwarded` or the gateway error kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "gateway_requests_total";
pub const REQUEST_DURATION: &str = "gateway_request_duration_seconds";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(REQUESTS_TOTAL, "Requests handled by the gateway");
    describe_histogram!(
        REQUEST_DURATION,
        Unit::Seconds,
        "Time from inbound request to response"
    );

    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_request(method: &str, status: u16, outcome: &'static str, start_time: Instant) {
    let method = method.to_string();
    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "outcome" => outcome)
        .record(start_time.elapsed().as_secs_f64());
}
