//! Request context types.
//!
//! The [`RequestContext`] carries per-request state through the interceptor
//! chain and into handlers.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::server_context::ServerContext;
use crate::session::Session;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
///
/// # Example
///
/// ```
/// use heron_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context shared by interceptors and the handler.
///
/// Holds the server-wide context, the client's session and a key/value
/// data bag scoped to this request. The data bag is what template outputs
/// are rendered with. Clones share the same data bag.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use heron_core::{DefaultServerContext, RequestContext, Session};
///
/// let ctx = RequestContext::new(
///     Arc::new(DefaultServerContext::new()),
///     Arc::new(Session::new("s1", std::time::Duration::from_secs(60))),
/// );
/// ctx.insert("title", "Users");
/// assert_eq!(ctx.get("title"), Some("Users".into()));
/// assert_eq!(ctx.session().id(), "s1");
/// ```
#[derive(Clone)]
pub struct RequestContext {
    request_id: RequestId,
    server: Arc<dyn ServerContext>,
    session: Arc<Session>,
    data: Arc<Mutex<Map<String, Value>>>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request id and an empty data bag.
    #[must_use]
    pub fn new(server: Arc<dyn ServerContext>, session: Arc<Session>) -> Self {
        Self {
            request_id: RequestId::new(),
            server,
            session,
            data: Arc::new(Mutex::new(Map::new())),
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the server-wide context.
    #[must_use]
    pub fn server(&self) -> &dyn ServerContext {
        self.server.as_ref()
    }

    /// Returns a shared handle to the server-wide context.
    #[must_use]
    pub fn server_handle(&self) -> Arc<dyn ServerContext> {
        Arc::clone(&self.server)
    }

    /// Returns the session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Stores a value in the data bag.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Returns a copy of a data bag value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Removes and returns a data bag value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.lock().remove(key)
    }

    /// Returns the data bag as a JSON object.
    #[must_use]
    pub fn data(&self) -> Value {
        Value::Object(self.data.lock().clone())
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("session", &self.session.id())
            .field("data", &*self.data.lock())
            .finish_non_exhaustive()
    }
}
