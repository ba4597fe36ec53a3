//! Logging and request metrics for Heron.
//!
//! - **Logging**: [`logging::init_logging`] installs a `tracing-subscriber`
//!   registry, JSON or pretty, filtered by an `EnvFilter`
//! - **Metrics**: [`metrics::init_metrics`] installs a Prometheus exporter;
//!   the server records request counts, latency and in-flight requests
//!
//! Both read their settings from [`heron_config::HeronConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_config::HeronConfig;
//!
//! let config = HeronConfig::default();
//! heron_telemetry::init(&config)?;
//! ```

#![doc(html_root_url = "https://docs.rs/heron-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;

use heron_config::HeronConfig;

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Installs logging and metrics as configured.
///
/// # Errors
///
/// Returns the first initialization failure.
pub fn init(config: &HeronConfig) -> TelemetryResult<()> {
    logging::init_logging(&config.logging)?;
    metrics::init_metrics(&config.metrics)
}
