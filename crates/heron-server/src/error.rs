//! Server error types.

use std::io;
use std::net::SocketAddr;

use heron_config::ConfigError;
use heron_router::RouteError;
use thiserror::Error;

/// Errors raised while building or running a [`Server`](crate::Server).
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address is not a socket address.
    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress {
        /// The rejected address.
        addr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Failed to bind to the configured address.
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be applied.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route could not be registered.
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Errors raised when registering a shutdown hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownHookError {
    /// A hook with this name is already registered.
    #[error("shutdown hook '{0}' is already registered")]
    Duplicate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServerError::InvalidAddress {
            addr: "nowhere".to_string(),
            reason: "invalid socket address syntax".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid address 'nowhere': invalid socket address syntax"
        );

        let err = ShutdownHookError::Duplicate("db".to_string());
        assert_eq!(err.to_string(), "shutdown hook 'db' is already registered");
    }

    #[test]
    fn test_route_error_converts() {
        let err: ServerError = RouteError::InvalidMethod("G ET".to_string()).into();
        assert!(matches!(err, ServerError::Route(_)));
    }
}
