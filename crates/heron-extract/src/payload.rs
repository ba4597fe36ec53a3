//! Request body binding.
//!
//! A [`Payload<T>`] parameter starts as `T::default()`. For methods that
//! carry a body (`POST`, `PUT`, `PATCH`) with a `Content-Type` header, the
//! body is decoded according to the media type:
//!
//! | Media type | Format |
//! |------------|--------|
//! | `application/json`, `text/json` | [`BodyFormat::Json`] |
//! | `application/xml`, `text/xml` | [`BodyFormat::Xml`] |
//!
//! Media types compare case-insensitively and parameters after `;` are
//! ignored. Any other media type leaves the default value in place.

use std::fmt;
use std::ops::{Deref, DerefMut};

use heron_core::Request;
use http::Method;
use mime::Mime;
use serde::de::DeserializeOwned;

use crate::bind::{DispatchParts, FromDispatch, ParamRole};
use crate::error::DispatchError;

/// A decodable request body format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyFormat {
    /// `application/json` or `text/json`.
    Json,
    /// `application/xml` or `text/xml`.
    Xml,
}

impl BodyFormat {
    /// Selects the format for a `Content-Type` header value.
    ///
    /// ```
    /// use heron_extract::BodyFormat;
    ///
    /// assert_eq!(BodyFormat::from_content_type("Application/JSON; charset=utf-8"), Some(BodyFormat::Json));
    /// assert_eq!(BodyFormat::from_content_type("text/xml"), Some(BodyFormat::Xml));
    /// assert_eq!(BodyFormat::from_content_type("text/plain"), None);
    /// ```
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media: Mime = content_type.trim().to_ascii_lowercase().parse().ok()?;
        if media.type_() != mime::APPLICATION && media.type_() != mime::TEXT {
            return None;
        }
        if media.subtype() == mime::JSON {
            Some(Self::Json)
        } else if media.subtype() == mime::XML {
            Some(Self::Xml)
        } else {
            None
        }
    }

    /// Decodes `body` into `T`.
    pub fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, DispatchError> {
        match self {
            Self::Json => {
                serde_json::from_slice(body).map_err(|e| DispatchError::body_decode(self, e.to_string()))
            }
            Self::Xml => {
                let text = std::str::from_utf8(body)
                    .map_err(|e| DispatchError::body_decode(self, e.to_string()))?;
                quick_xml::de::from_str(text).map_err(|e| DispatchError::body_decode(self, e.to_string()))
            }
        }
    }
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

/// Returns true if requests with `method` have their body decoded.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// A handler parameter bound from the request body.
///
/// # Example
///
/// ```
/// use heron_extract::Payload;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct NewUser {
///     name: String,
/// }
///
/// async fn create(Payload(user): Payload<NewUser>) -> String {
///     user.name
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload<T>(pub T);

impl<T> Payload<T> {
    /// Consumes the payload and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned + Default> Payload<T> {
    /// Binds the payload from `req`.
    pub fn from_request(req: &Request) -> Result<Self, DispatchError> {
        if !carries_body(req.method()) {
            return Ok(Self(T::default()));
        }
        let Some(format) = req.content_type().and_then(BodyFormat::from_content_type) else {
            return Ok(Self(T::default()));
        };
        format.decode(req.body()).map(Self)
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Payload<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromDispatch for Payload<T>
where
    T: DeserializeOwned + Default + Send + 'static,
{
    const ROLE: ParamRole = ParamRole::Payload;

    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError> {
        Self::from_request(parts.request())
    }
}
