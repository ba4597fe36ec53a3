//! Main configuration types.
//!
//! This module provides the top-level [`HeronConfig`] struct and its builder.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LoggingConfig, MetricsConfig, PropertiesConfig, ServerConfig, SessionConfig};

/// Complete Heron server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.session.cookie_name, "heronSession");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// System properties.
    #[serde(default)]
    pub properties: PropertiesConfig,
}

impl HeronConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::{HeronConfig, ServerConfig};
    ///
    /// let config = HeronConfig::builder()
    ///     .server(ServerConfig {
    ///         http_addr: "127.0.0.1:3000".to_string(),
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    #[must_use]
    pub fn builder() -> HeronConfigBuilder {
        HeronConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The server or (enabled) metrics address is not a socket address
    /// - A timeout, session lifetime or sweep interval is zero
    /// - The session cookie name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.metrics.enabled && self.metrics.addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "metrics.addr",
                format!("invalid socket address: {}", self.metrics.addr),
            ));
        }

        let durations = [
            ("server.shutdown_timeout_secs", self.server.shutdown_timeout_secs),
            ("server.request_timeout_ms", self.server.request_timeout_ms),
            ("session.lifetime_secs", self.session.lifetime_secs),
            ("session.sweep_interval_secs", self.session.sweep_interval_secs),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(ConfigError::invalid_value(field, "must be greater than zero"));
            }
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::invalid_value(
                "session.cookie_name",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, colored logs at debug level with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::{HeronConfig, LogFormat};
    ///
    /// let config = HeronConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = crate::LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level and the Prometheus exporter enabled.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = crate::LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.metrics.enabled = true;
        config
    }
}

/// Builder for [`HeronConfig`].
#[derive(Debug, Default)]
pub struct HeronConfigBuilder {
    server: Option<ServerConfig>,
    session: Option<SessionConfig>,
    logging: Option<LoggingConfig>,
    metrics: Option<MetricsConfig>,
    properties: Option<PropertiesConfig>,
}

impl HeronConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server configuration.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the session configuration.
    #[must_use]
    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the properties configuration.
    #[must_use]
    pub fn properties(mut self, properties: PropertiesConfig) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Build the configuration.
    ///
    /// Sections that were not set use their defaults.
    #[must_use]
    pub fn build(self) -> HeronConfig {
        HeronConfig {
            server: self.server.unwrap_or_default(),
            session: self.session.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            properties: self.properties.unwrap_or_default(),
        }
    }
}
