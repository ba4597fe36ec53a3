//! Method keys for per-node handler bindings.

use std::fmt;

use http::Method;

use crate::error::RouteError;

/// The wildcard method marker accepted at registration.
pub const ANY_METHOD: &str = "*";

/// Key under which a handler is bound on a [`RouteNode`](crate::RouteNode).
///
/// # Example
///
/// ```rust
/// use heron_router::MethodKey;
/// use http::Method;
///
/// assert_eq!(MethodKey::parse("*").unwrap(), MethodKey::Any);
/// assert_eq!(MethodKey::parse("GET").unwrap(), MethodKey::Exact(Method::GET));
/// assert!(MethodKey::parse("NOT A METHOD").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    /// Matches any method that has no exact binding.
    Any,
    /// Matches exactly one method.
    Exact(Method),
}

impl MethodKey {
    /// Parses a registration method string.
    ///
    /// `*` maps to [`MethodKey::Any`]; anything else must be a valid method
    /// token. Method names are case-sensitive, as in HTTP.
    pub fn parse(method: &str) -> Result<Self, RouteError> {
        if method == ANY_METHOD {
            return Ok(Self::Any);
        }
        Method::from_bytes(method.as_bytes())
            .map(Self::Exact)
            .map_err(|_| RouteError::InvalidMethod(method.to_string()))
    }
}

impl From<Method> for MethodKey {
    fn from(method: Method) -> Self {
        Self::Exact(method)
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY_METHOD),
            Self::Exact(method) => f.write_str(method.as_str()),
        }
    }
}
