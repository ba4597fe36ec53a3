//! The inbound request as seen by interceptors and handlers.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{self, AsHeaderName};
use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};

/// An inbound HTTP request with a fully collected body.
///
/// Cloning is cheap; all clones share the same head and body.
///
/// # Example
///
/// ```
/// use heron_core::Request;
///
/// let req = Request::builder()
///     .method("POST")
///     .uri("/users/42?expand=true")
///     .header("cookie", "theme=dark; heronSession=abc")
///     .body("{}")
///     .unwrap();
///
/// assert_eq!(req.path(), "/users/42");
/// assert_eq!(req.query(), Some("expand=true"));
/// assert_eq!(req.cookie("heronSession"), Some("abc"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    inner: Arc<RequestInner>,
}

#[derive(Debug)]
struct RequestInner {
    parts: Parts,
    body: Bytes,
}

impl Request {
    /// Creates a request from its head and collected body.
    #[must_use]
    pub fn new(parts: Parts, body: Bytes) -> Self {
        Self {
            inner: Arc::new(RequestInner { parts, body }),
        }
    }

    /// Starts building a request, mostly useful in tests.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            inner: http::Request::builder(),
        }
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.parts.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.inner.parts.uri
    }

    /// Returns the path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.inner.parts.uri.path()
    }

    /// Returns the raw query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.inner.parts.uri.query()
    }

    /// Returns the path followed by `?query` when a query is present.
    #[must_use]
    pub fn path_and_query(&self) -> &str {
        self.inner
            .parts
            .uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str)
    }

    /// Returns the non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path().split('/').filter(|s| !s.is_empty())
    }

    /// Returns the HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.inner.parts.version
    }

    /// Returns all headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// Returns the first value of a header, if it is valid UTF-8.
    #[must_use]
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.inner.parts.headers.get(name)?.to_str().ok()
    }

    /// Returns the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE)
    }

    /// Returns the value of the named cookie.
    ///
    /// All `Cookie` headers are searched; the first match wins.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.inner
            .parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"'))
    }

    /// Returns the collected body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Returns the request extensions.
    #[must_use]
    pub fn extensions(&self) -> &http::Extensions {
        &self.inner.parts.extensions
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts, body)
    }
}

/// Builder for [`Request`], wrapping [`http::request::Builder`].
#[derive(Debug)]
pub struct RequestBuilder {
    inner: http::request::Builder,
}

impl RequestBuilder {
    /// Sets the method.
    #[must_use]
    pub fn method<T>(mut self, method: T) -> Self
    where
        Method: TryFrom<T>,
        <Method as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.method(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri<T>(mut self, uri: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.uri(uri);
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        http::HeaderName: TryFrom<K>,
        <http::HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        http::HeaderValue: TryFrom<V>,
        <http::HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.inner = self.inner.header(key, value);
        self
    }

    /// Finishes the request with `body`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid method, URI or header passed to the builder.
    pub fn body(self, body: impl Into<Bytes>) -> Result<Request, http::Error> {
        Ok(Request::from(self.inner.body(body.into())?))
    }
}
