//! Error types for Heron.
//!
//! [`StatusError`] is the error a handler returns to answer with a specific
//! HTTP status. [`HandlerError`] is what every handler error converts into:
//! either a status, or an opaque failure that is logged and swallowed.

use std::borrow::Cow;

use http::StatusCode;
use thiserror::Error;

/// An error carrying an HTTP status code and a message.
///
/// When a handler fails with a `StatusError`, the dispatcher answers with
/// that status and the message as body. `401 Unauthorized` is special-cased
/// into a redirect to `/`.
///
/// # Example
///
/// ```
/// use heron_core::StatusError;
/// use http::StatusCode;
///
/// let err = StatusError::NOT_FOUND;
/// assert_eq!(err.code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "Not Found");
///
/// let custom = StatusError::new(StatusCode::CONFLICT, "user already exists");
/// assert_eq!(custom.message(), "user already exists");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StatusError {
    code: StatusCode,
    message: Cow<'static, str>,
}

macro_rules! status_errors {
    ($($(#[$meta:meta])* $name:ident => $message:literal;)+) => {
        impl StatusError {
            $(
                $(#[$meta])*
                pub const $name: Self = Self {
                    code: StatusCode::$name,
                    message: Cow::Borrowed($message),
                };
            )+
        }
    };
}

status_errors! {
    /// 400 Bad Request
    BAD_REQUEST => "Bad Request";
    /// 401 Unauthorized
    UNAUTHORIZED => "Unauthorized";
    /// 402 Payment Required
    PAYMENT_REQUIRED => "Payment Required";
    /// 403 Forbidden
    FORBIDDEN => "Forbidden";
    /// 404 Not Found
    NOT_FOUND => "Not Found";
    /// 405 Method Not Allowed
    METHOD_NOT_ALLOWED => "Method Not Allowed";
    /// 406 Not Acceptable
    NOT_ACCEPTABLE => "Not Acceptable";
    /// 407 Proxy Authentication Required
    PROXY_AUTHENTICATION_REQUIRED => "Proxy Authentication Required";
    /// 408 Request Timeout
    REQUEST_TIMEOUT => "Request Timeout";
    /// 409 Conflict
    CONFLICT => "Conflict";
    /// 410 Gone
    GONE => "Gone";
    /// 411 Length Required
    LENGTH_REQUIRED => "Length Required";
    /// 412 Precondition Failed
    PRECONDITION_FAILED => "Precondition Failed";
    /// 413 Payload Too Large
    PAYLOAD_TOO_LARGE => "Request Entity Too Large";
    /// 414 URI Too Long
    URI_TOO_LONG => "Request-URI Too Long";
    /// 415 Unsupported Media Type
    UNSUPPORTED_MEDIA_TYPE => "Unsupported Media Type";
    /// 416 Range Not Satisfiable
    RANGE_NOT_SATISFIABLE => "Requested Range Not Satisfiable";
    /// 417 Expectation Failed
    EXPECTATION_FAILED => "Expectation Failed";
    /// 500 Internal Server Error
    INTERNAL_SERVER_ERROR => "Internal Server Error";
    /// 501 Not Implemented
    NOT_IMPLEMENTED => "Not Implemented";
    /// 502 Bad Gateway
    BAD_GATEWAY => "Bad Gateway";
    /// 503 Service Unavailable
    SERVICE_UNAVAILABLE => "Service Unavailable";
    /// 504 Gateway Timeout
    GATEWAY_TIMEOUT => "Gateway Timeout";
    /// 505 HTTP Version Not Supported
    HTTP_VERSION_NOT_SUPPORTED => "HTTP Version Not Supported";
}

impl StatusError {
    /// Creates a status error with a custom message.
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates a status error using the canonical reason phrase as message.
    #[must_use]
    pub fn from_status(code: StatusCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(code.canonical_reason().unwrap_or("")),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Returns the message written as response body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The error type handlers return.
///
/// Anything convertible into `anyhow::Error` becomes [`HandlerError::Other`],
/// which the dispatcher logs and otherwise ignores.
///
/// # Example
///
/// ```
/// use heron_core::{HandlerError, StatusError};
///
/// fn find(id: &str) -> Result<String, HandlerError> {
///     if id.is_empty() {
///         return Err(StatusError::BAD_REQUEST.into());
///     }
///     Ok(id.to_string())
/// }
///
/// assert!(matches!(find(""), Err(HandlerError::Status(_))));
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Answer with a specific status.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps an arbitrary error as [`HandlerError::Other`].
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(anyhow::Error::new(error))
    }

    /// Returns the status error, if this is one.
    #[must_use]
    pub const fn as_status(&self) -> Option<&StatusError> {
        match self {
            Self::Status(status) => Some(status),
            Self::Other(_) => None,
        }
    }
}

/// Errors raised by a [`TemplateRenderer`](crate::TemplateRenderer).
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template engine is configured.
    #[error("no template engine configured")]
    NotConfigured,

    /// The named template does not exist.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Rendering the template failed.
    #[error("failed to render template {name}: {message}")]
    Render {
        /// Template name.
        name: String,
        /// Engine error message.
        message: String,
    },
}

/// Errors raised by a [`Database`](crate::Database).
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The statement could not be prepared or executed.
    #[error("statement failed: {0}")]
    Statement(String),

    /// The connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other driver error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
