//! Dispatch error types.

use heron_core::{HandlerError, StatusError};
use thiserror::Error;

use crate::payload::BodyFormat;

/// Error produced while binding, invoking, or serializing a handler.
///
/// # Example
///
/// ```
/// use heron_core::StatusError;
/// use heron_extract::DispatchError;
///
/// let err = DispatchError::from(StatusError::FORBIDDEN);
/// assert_eq!(err.as_status(), Some(&StatusError::FORBIDDEN));
/// ```
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request body could not be decoded into a payload parameter.
    ///
    /// Raised before the handler is invoked.
    #[error("failed to decode {format} request body: {message}")]
    BodyDecode {
        /// The format selected from the content type.
        format: BodyFormat,
        /// The decoder's error message.
        message: String,
    },

    /// The handler returned an error.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Creates a body decoding error.
    #[must_use]
    pub fn body_decode(format: BodyFormat, message: impl Into<String>) -> Self {
        Self::BodyDecode {
            format,
            message: message.into(),
        }
    }

    /// Returns the status error carried by a handler error, if any.
    #[must_use]
    pub const fn as_status(&self) -> Option<&StatusError> {
        match self {
            Self::Handler(err) => err.as_status(),
            Self::BodyDecode { .. } => None,
        }
    }
}

impl From<StatusError> for DispatchError {
    fn from(err: StatusError) -> Self {
        Self::Handler(HandlerError::Status(err))
    }
}
