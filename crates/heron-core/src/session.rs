//! Cookie-keyed, in-memory sessions.
//!
//! [`SessionManager`] issues a session per client, keyed by a random id
//! stored in a cookie. Each request refreshes the session's expiry and
//! re-sends the cookie. Expired sessions are removed by a periodic sweep
//! that runs independently of traffic (see [`spawn_sweeper`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use heron_config::SessionConfig;
use http::header::{self, HeaderValue};
use parking_lot::Mutex;
use rand::RngCore;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::request::Request;
use crate::response::ResponseWriter;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "heronSession";

/// Default inactivity lifetime.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// Default sweep interval.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Number of random bytes in a session id.
const ID_BYTES: usize = 32;

/// A client session holding arbitrary JSON values.
///
/// # Example
///
/// ```
/// use heron_core::Session;
/// use std::time::Duration;
///
/// let session = Session::new("abc", Duration::from_secs(60));
/// session.set("user", "ada");
/// assert_eq!(session.get("user"), Some("ada".into()));
/// assert!(!session.is_expired());
/// ```
pub struct Session {
    id: String,
    created_at: SystemTime,
    expires_at: Mutex<SystemTime>,
    values: Mutex<Map<String, Value>>,
}

impl Session {
    /// Creates a session expiring `lifetime` from now.
    #[must_use]
    pub fn new(id: impl Into<String>, lifetime: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            id: id.into(),
            created_at: now,
            expires_at: Mutex::new(now + lifetime),
            values: Mutex::new(Map::new()),
        }
    }

    /// Returns the session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a copy of a stored value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    /// Stores a value, replacing any previous one.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.lock().insert(key.into(), value.into());
    }

    /// Removes and returns a value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.lock().remove(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().contains_key(key)
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns when the session expires.
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        *self.expires_at.lock()
    }

    /// Pushes the expiry out to `lifetime` from now.
    pub fn touch(&self, lifetime: Duration) {
        *self.expires_at.lock() = SystemTime::now() + lifetime;
    }

    /// Returns true once the expiry has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at()
    }

    fn is_expired_at(&self, now: SystemTime) -> bool {
        now > self.expires_at()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at())
            .finish_non_exhaustive()
    }
}

/// Resolves the session of a request.
pub trait SessionStore: Send + Sync {
    /// Returns the session for `req`, creating one when needed, and sets the
    /// session cookie on `resp`.
    fn sync(&self, resp: &ResponseWriter, req: &Request) -> Arc<Session>;

    /// Removes expired sessions and returns how many were removed.
    fn sweep(&self) -> usize;
}

/// The default in-memory [`SessionStore`].
///
/// # Example
///
/// ```
/// use heron_core::{Request, ResponseWriter, SessionManager, SessionStore};
///
/// let manager = SessionManager::new();
/// let req = Request::builder().uri("/").body("").unwrap();
/// let resp = ResponseWriter::new();
///
/// let session = manager.sync(&resp, &req);
/// let cookie = resp.header(&http::header::SET_COOKIE).unwrap();
/// assert!(cookie.to_str().unwrap().starts_with(&format!("heronSession={}", session.id())));
/// ```
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    cookie_name: String,
    lifetime: Duration,
    sweep_interval: Duration,
}

impl SessionManager {
    /// Creates a manager with the default cookie name and durations.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_COOKIE_NAME, DEFAULT_LIFETIME, DEFAULT_SWEEP_INTERVAL)
    }

    /// Creates a manager with explicit settings.
    #[must_use]
    pub fn with_settings(
        cookie_name: impl Into<String>,
        lifetime: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            cookie_name: cookie_name.into(),
            lifetime,
            sweep_interval,
        }
    }

    /// Creates a manager from the session configuration section.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_settings(
            config.cookie_name.clone(),
            config.lifetime(),
            config.sweep_interval(),
        )
    }

    /// Returns the cookie name.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the session lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Returns the sweep interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Returns the number of live (not yet swept) sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Returns true if no sessions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Returns a session by id, if it exists.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(id).cloned()
    }

    /// Removes a session by id.
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().remove(id)
    }

    fn new_id() -> String {
        let mut bytes = [0u8; ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE.encode(bytes)
    }

    fn set_cookie(&self, resp: &ResponseWriter, session: &Session) {
        let cookie = format!(
            "{}={}; Path=/; Expires={}",
            self.cookie_name,
            session.id(),
            httpdate::fmt_http_date(session.expires_at())
        );
        match HeaderValue::try_from(cookie) {
            Ok(value) => resp.append_header(header::SET_COOKIE, value),
            Err(_) => debug!(cookie = %self.cookie_name, "session cookie is not a valid header value"),
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie_name", &self.cookie_name)
            .field("lifetime", &self.lifetime)
            .field("sweep_interval", &self.sweep_interval)
            .field("sessions", &self.len())
            .finish()
    }
}

impl SessionStore for SessionManager {
    fn sync(&self, resp: &ResponseWriter, req: &Request) -> Arc<Session> {
        let session = {
            let mut sessions = self.sessions.lock();
            let existing = req
                .cookie(&self.cookie_name)
                .and_then(|id| sessions.get(id))
                .filter(|session| !session.is_expired())
                .cloned();

            match existing {
                Some(session) => {
                    session.touch(self.lifetime);
                    session
                }
                None => {
                    let session = Arc::new(Session::new(Self::new_id(), self.lifetime));
                    trace!(session = %session.id(), "created session");
                    sessions.insert(session.id().to_string(), Arc::clone(&session));
                    session
                }
            }
        };

        self.set_cookie(resp, &session);
        session
    }

    fn sweep(&self) -> usize {
        let now = SystemTime::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }
}

/// Spawns a task that sweeps `store` every `interval`.
///
/// The task runs until aborted. Must be called from within a Tokio runtime.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep();
            if removed > 0 {
                debug!(removed, "swept expired sessions");
            }
        }
    })
}
