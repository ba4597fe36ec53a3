//! The live response writer handed to interceptors and handlers.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderName, HeaderValue, IntoHeaderName};
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use tracing::debug;

/// A buffered, shareable response.
///
/// The response is *committed* by the first explicit status or the first
/// body write. After that, status and header changes are ignored, so at
/// most one status is ever sent. Writing without a status commits `200 OK`.
///
/// Clones share the same underlying response.
///
/// # Example
///
/// ```
/// use heron_core::ResponseWriter;
/// use http::StatusCode;
///
/// let resp = ResponseWriter::new();
/// resp.set_header(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());
/// resp.write(b"hello");
/// resp.set_status(StatusCode::CREATED); // ignored
///
/// let response = resp.into_response();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), b"hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    state: Arc<Mutex<ResponseState>>,
}

#[derive(Debug, Default)]
struct ResponseState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseState {
    fn is_committed(&self) -> bool {
        self.status.is_some()
    }
}

impl ResponseWriter {
    /// Creates an empty, uncommitted response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status and commits the response.
    ///
    /// Ignored if the response is already committed.
    pub fn set_status(&self, status: StatusCode) {
        let mut state = self.state.lock();
        if let Some(current) = state.status {
            debug!(current = %current, ignored = %status, "status already committed");
            return;
        }
        state.status = Some(status);
    }

    /// Replaces a header. Ignored once committed.
    pub fn set_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        let mut state = self.state.lock();
        if !state.is_committed() {
            state.headers.insert(name, value);
        }
    }

    /// Appends a header value. Ignored once committed.
    pub fn append_header<K: IntoHeaderName>(&self, name: K, value: HeaderValue) {
        let mut state = self.state.lock();
        if !state.is_committed() {
            state.headers.append(name, value);
        }
    }

    /// Removes a header. Ignored once committed.
    pub fn remove_header(&self, name: &HeaderName) {
        let mut state = self.state.lock();
        if !state.is_committed() {
            state.headers.remove(name);
        }
    }

    /// Appends to the body, committing `200 OK` if no status was set.
    pub fn write(&self, data: &[u8]) {
        let mut state = self.state.lock();
        state.status.get_or_insert(StatusCode::OK);
        state.body.extend_from_slice(data);
    }

    /// Redirects to `location` with the given status.
    pub fn redirect(&self, location: &str, status: StatusCode) {
        match HeaderValue::try_from(location) {
            Ok(value) => self.set_header(header::LOCATION, value),
            Err(_) => debug!(location = %location, "redirect location is not a valid header value"),
        }
        self.set_status(status);
    }

    /// Answers with a plain-text error message.
    ///
    /// Sets `Content-Type: text/plain; charset=utf-8` and
    /// `X-Content-Type-Options: nosniff`, commits `status` and writes the
    /// message followed by a newline.
    pub fn error(&self, message: &str, status: StatusCode) {
        self.remove_header(&header::CONTENT_LENGTH);
        self.set_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.set_header(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        self.set_status(status);

        let mut state = self.state.lock();
        state.body.extend_from_slice(message.as_bytes());
        state.body.extend_from_slice(b"\n");
    }

    /// Returns the committed status, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.state.lock().status
    }

    /// Returns true once a status or body has been written.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state.lock().is_committed()
    }

    /// Returns a copy of a header value.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.state.lock().headers.get(name).cloned()
    }

    /// Returns the number of body bytes written so far.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.state.lock().body.len()
    }

    /// Takes the buffered response out of the writer.
    ///
    /// The writer is left empty and uncommitted. An uncommitted response
    /// becomes `200 OK`.
    #[must_use]
    pub fn into_response(&self) -> http::Response<Bytes> {
        let state = std::mem::take(&mut *self.state.lock());

        let mut response = http::Response::new(state.body.freeze());
        *response.status_mut() = state.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = state.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncommitted_defaults_to_ok() {
        let resp = ResponseWriter::new();
        assert!(!resp.is_committed());

        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_first_status_wins() {
        let resp = ResponseWriter::new();
        resp.set_status(StatusCode::NOT_FOUND);
        resp.set_status(StatusCode::OK);
        assert_eq!(resp.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_headers_ignored_after_commit() {
        let resp = ResponseWriter::new();
        resp.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        resp.write(b"{}");
        resp.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

        assert_eq!(
            resp.header(&header::CONTENT_TYPE),
            Some(HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn test_writes_accumulate() {
        let resp = ResponseWriter::new();
        resp.write(b"hello ");
        resp.write(b"world");
        assert_eq!(resp.body_len(), 11);
        assert_eq!(resp.into_response().body().as_ref(), b"hello world");
    }

    #[test]
    fn test_error_response() {
        let resp = ResponseWriter::new();
        resp.error("Not Found", StatusCode::NOT_FOUND);

        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_ref(), b"Not Found\n");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn test_error_after_commit_keeps_status() {
        let resp = ResponseWriter::new();
        resp.write(b"partial");
        resp.error("boom", StatusCode::INTERNAL_SERVER_ERROR);

        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"partialboom\n");
    }

    #[test]
    fn test_redirect() {
        let resp = ResponseWriter::new();
        resp.redirect("/login", StatusCode::FOUND);

        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn test_append_header() {
        let resp = ResponseWriter::new();
        resp.append_header(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        resp.append_header(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let response = resp.into_response();
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let resp = ResponseWriter::new();
        let clone = resp.clone();
        clone.set_status(StatusCode::ACCEPTED);
        assert_eq!(resp.status(), Some(StatusCode::ACCEPTED));
    }
}
