//! Errors raised while assembling a [`HeronConfig`](crate::HeronConfig).

use std::path::PathBuf;
use thiserror::Error;

/// A configuration or properties source could not be turned into settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file or properties location does not exist.
    #[error("no configuration source at {path}")]
    NotFound {
        /// The missing file or directory.
        path: PathBuf,
    },

    /// A file or directory exists but could not be read.
    #[error("cannot read {path}")]
    Read {
        /// The unreadable file or directory.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Only `toml` and `json` sources are understood.
    #[error("unsupported configuration format '{0}'")]
    UnsupportedFormat(String),

    /// A TOML source did not match the schema.
    #[error("malformed TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON source did not match the schema.
    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting parsed but is out of range, such as a zero timeout.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted setting name, e.g. `session.lifetime_secs`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `HERON__SECTION__KEY` override has a value of the wrong type.
    #[error("environment override {var}: {reason}")]
    EnvOverride {
        /// The environment variable name.
        var: String,
        /// The expected type.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Builds an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
