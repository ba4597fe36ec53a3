//! Route registration errors.

use thiserror::Error;

/// Errors raised while registering routes.
///
/// Lookups never fail with an error; an unmatched path is simply `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path handed to a node does not live under that node's prefix.
    ///
    /// Only reachable when registering directly on a non-root node.
    #[error("path '{path}' does not start with node prefix '{prefix}'")]
    PrefixMismatch {
        /// Prefix of the node the registration was attempted on.
        prefix: String,
        /// The offending path.
        path: String,
    },

    /// The same method is already bound at this path.
    #[error("duplicate handler for {method} {path}")]
    Duplicate {
        /// Method marker that was already bound.
        method: String,
        /// Path of the node holding the existing binding.
        path: String,
    },

    /// The method string is neither `*` nor a valid HTTP method token.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
}
