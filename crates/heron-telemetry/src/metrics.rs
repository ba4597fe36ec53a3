//! Prometheus request metrics.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_requests_total` | Counter | `method`, `status` | Total requests |
//! | `heron_request_duration_seconds` | Histogram | `method` | Request latency |
//! | `heron_in_flight_requests` | Gauge | - | In-flight requests |
//!
//! Recording functions are no-ops until a recorder is installed, so the
//! server calls them unconditionally.

use std::net::SocketAddr;
use std::time::Duration;

use heron_config::MetricsConfig;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "heron_requests_total";

/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "heron_request_duration_seconds";

/// In-flight gauge name.
pub const IN_FLIGHT_REQUESTS: &str = "heron_in_flight_requests";

/// Installs the Prometheus exporter with an HTTP scrape listener.
///
/// Does nothing when metrics are disabled. Must be called from within a
/// Tokio runtime so the listener is spawned on it.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable listener
/// address and `TelemetryError::MetricsInit` if the exporter cannot be
/// installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let mut builder = PrometheusBuilder::new().with_http_listener(addr);
    if !config.histogram_buckets.is_empty() {
        builder = builder
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                &config.histogram_buckets,
            )
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    builder
        .install()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    register_metric_descriptions();
    Ok(())
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(REQUEST_DURATION_SECONDS, "HTTP request duration in seconds");
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed request.
pub fn record_request(method: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(duration.as_secs_f64());
}

/// Increments the in-flight requests gauge.
pub fn increment_in_flight() {
    gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
}

/// Decrements the in-flight requests gauge.
pub fn decrement_in_flight() {
    gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
}

/// Guard that decrements in-flight requests on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight counter.
    #[must_use]
    pub fn new() -> Self {
        increment_in_flight();
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        decrement_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_is_noop() {
        assert!(init_metrics(&MetricsConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            addr: "not-an-address".to_string(),
            ..Default::default()
        };
        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAddress(_)));
    }

    #[test]
    fn test_record_functions_without_recorder() {
        record_request("GET", 200, Duration::from_millis(10));
        let guard = InFlightGuard::new();
        drop(guard);
    }
}
