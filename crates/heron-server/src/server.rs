//! HTTP transport.
//!
//! [`Server`] owns the routes, interceptors and shutdown hooks while they
//! are registered. [`Server::run`] freezes them into a [`Dispatcher`],
//! binds the listener and serves HTTP/1.1 connections on Tokio until the
//! shutdown signal fires.
//!
//! # Example
//!
//! ```rust,ignore
//! use heron_server::Server;
//!
//! async fn index() -> &'static str {
//!     "Welcome"
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::builder().http_addr("0.0.0.0:8080").build();
//!     server.route("GET", "/", index)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use heron_config::{HeronConfig, ServerConfig, SessionConfig};
use heron_core::{spawn_sweeper, DefaultServerContext, ServerContext, SessionManager, SessionStore};
use heron_middleware::Interceptor;
use heron_router::RouteError;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::dispatch::Dispatcher;
use crate::error::{ServerError, ShutdownHookError};
use crate::handler::Handler;
use crate::shutdown::{ConnectionTracker, ShutdownHooks, ShutdownSignal};
use crate::tree::HandlerTree;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// The Heron HTTP server.
///
/// # Example
///
/// ```rust
/// use heron_server::Server;
///
/// async fn show(_req: heron_core::Request) -> &'static str {
///     "details.html"
/// }
///
/// let mut server = Server::builder().http_addr("127.0.0.1:3000").build();
/// server.route("GET", "/items/*", show).unwrap();
/// assert_eq!(server.http_addr(), "127.0.0.1:3000");
/// ```
pub struct Server {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    sweep_interval: Duration,
    tree: HandlerTree,
    context: Arc<dyn ServerContext>,
    sessions: Arc<dyn SessionStore>,
    hooks: ShutdownHooks,
}

impl Server {
    /// Creates a server with the given transport settings, an empty
    /// [`DefaultServerContext`] and a default [`SessionManager`].
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let shutdown_timeout = config.shutdown_timeout();
        let request_timeout = config.request_timeout();
        Self::builder()
            .http_addr(config.http_addr)
            .shutdown_timeout(shutdown_timeout)
            .request_timeout(request_timeout)
            .build()
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Builds a server from a full configuration.
    ///
    /// Properties are loaded into a [`DefaultServerContext`] and sessions
    /// follow the `session` section.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the configuration is invalid or
    /// a properties file cannot be read.
    pub fn from_config(config: &HeronConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let context = DefaultServerContext::from_config(config)?;

        Ok(Self::builder()
            .http_addr(config.server.http_addr.clone())
            .shutdown_timeout(config.server.shutdown_timeout())
            .request_timeout(config.server.request_timeout())
            .session_config(&config.session)
            .context(Arc::new(context))
            .build())
    }

    /// Registers `handler` for `method` at `path`.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] of the routing tree; the server is left
    /// unchanged.
    pub fn route<H, Args>(
        &mut self,
        method: &str,
        path: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        self.tree.route(method, path, handler)?;
        Ok(self)
    }

    /// Appends an interceptor to its phase.
    pub fn intercept<I: Interceptor>(&mut self, interceptor: I) -> &mut Self {
        self.tree.intercept(interceptor);
        self
    }

    /// Registers a named hook run after the server stops.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownHookError::Duplicate`] if `name` is taken.
    pub fn on_shutdown<F, Fut>(
        &mut self,
        name: impl Into<String>,
        hook: F,
    ) -> Result<&mut Self, ShutdownHookError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.register(name, hook)?;
        Ok(self)
    }

    /// Returns the configured listen address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the handler tree.
    #[must_use]
    pub fn tree(&self) -> &HandlerTree {
        &self.tree
    }

    /// Returns the registered shutdown hooks.
    #[must_use]
    pub fn hooks(&self) -> &ShutdownHooks {
        &self.hooks
    }

    /// Freezes the routes and interceptors without starting the transport.
    ///
    /// Shutdown hooks are dropped.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(self.tree, self.context, self.sessions)
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server until `shutdown` is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr =
            self.http_addr
                .parse()
                .map_err(|e: std::net::AddrParseError| ServerError::InvalidAddress {
                    addr: self.http_addr.clone(),
                    reason: e.to_string(),
                })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.run_with_listener(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, routes = self.tree.routes().len(), "Server listening");

        let Self {
            shutdown_timeout,
            request_timeout,
            sweep_interval,
            tree,
            context,
            sessions,
            hooks,
            ..
        } = self;

        let sweeper = (!sweep_interval.is_zero())
            .then(|| spawn_sweeper(Arc::clone(&sessions), sweep_interval));
        let dispatcher = Arc::new(Dispatcher::new(tree, context, sessions));
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let dispatcher = Arc::clone(&dispatcher);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(
                                    dispatcher,
                                    stream,
                                    remote_addr,
                                    request_timeout,
                                    shutdown,
                                )
                                .await
                                {
                                    tracing::error!(remote = %remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        tracing::info!(
            timeout = ?shutdown_timeout,
            active = tracker.active_connections(),
            "Waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_shutdown() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "Shutdown timeout reached with connections still active"
                );
            }
        }

        if !hooks.is_empty() {
            let total = hooks.len();
            let completed = hooks.run(shutdown_timeout).await;
            tracing::info!(completed, total, "Shutdown hooks finished");
        }

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("http_addr", &self.http_addr)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .field("tree", &self.tree)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

async fn handle_connection(
    dispatcher: Arc<Dispatcher>,
    stream: TcpStream,
    remote_addr: SocketAddr,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: Request<Incoming>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { handle_request(&dispatcher, request_timeout, req).await }
    });

    let conn = http1::Builder::new().serve_connection(io, service);

    tokio::select! {
        result = conn => result,
        () = shutdown.recv() => {
            tracing::debug!(remote = %remote_addr, "connection closed due to shutdown");
            Ok(())
        }
    }
}

async fn handle_request(
    dispatcher: &Dispatcher,
    request_timeout: Duration,
    req: Request<Incoming>,
) -> Result<HttpResponse, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match tokio::time::timeout(request_timeout, body.collect()).await {
        Ok(Ok(collected)) => collected.to_bytes(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to read request body");
            return Ok(plain_response(StatusCode::BAD_REQUEST, "Failed to read request body"));
        }
        Err(_) => {
            tracing::warn!(path = %parts.uri.path(), "request body collection timed out");
            return Ok(plain_response(StatusCode::REQUEST_TIMEOUT, "Request body collection timed out"));
        }
    };

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let req = Request::from_parts(parts, body);

    match tokio::time::timeout(request_timeout, dispatcher.handle(req)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            tracing::warn!(method = %method, path = %path, "request dispatch timed out");
            Ok(plain_response(StatusCode::GATEWAY_TIMEOUT, "Request dispatch timed out"))
        }
    }
}

fn plain_response(status: StatusCode, message: &str) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(format!("{message}\n"))));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Builder for a [`Server`].
///
/// # Example
///
/// ```rust
/// use heron_server::Server;
/// use std::time::Duration;
///
/// let server = Server::builder()
///     .http_addr("0.0.0.0:9090")
///     .shutdown_timeout(Duration::from_secs(60))
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(server.shutdown_timeout(), Duration::from_secs(60));
/// ```
pub struct ServerBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    session: SessionConfig,
    context: Option<Arc<dyn ServerContext>>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            shutdown_timeout: server.shutdown_timeout(),
            request_timeout: server.request_timeout(),
            http_addr: server.http_addr,
            session: SessionConfig::default(),
            context: None,
            sessions: None,
        }
    }
}

impl ServerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the listen address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the timeout for body collection and for dispatch.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the session cookie name, lifetime and sweep interval.
    ///
    /// Ignored for the store when [`session_store`](Self::session_store)
    /// is set, except for the sweep interval.
    #[must_use]
    pub fn session_config(mut self, config: &SessionConfig) -> Self {
        self.session = config.clone();
        self
    }

    /// Sets the server-wide context.
    #[must_use]
    pub fn context(mut self, context: Arc<dyn ServerContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the session store.
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let context = self
            .context
            .unwrap_or_else(|| Arc::new(DefaultServerContext::new()));
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(SessionManager::from_config(&self.session)));

        Server {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
            sweep_interval: self.session.sweep_interval(),
            tree: HandlerTree::new(),
            context,
            sessions,
            hooks: ShutdownHooks::new(),
        }
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("http_addr", &self.http_addr)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn index() -> &'static str {
        "index.html"
    }

    #[test]
    fn test_server_new_from_server_config() {
        let server = Server::new(ServerConfig {
            http_addr: "127.0.0.1:4000".to_string(),
            shutdown_timeout_secs: 5,
            request_timeout_ms: 250,
        });
        assert_eq!(server.http_addr(), "127.0.0.1:4000");
        assert_eq!(server.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(server.request_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_route_chaining_and_duplicates() {
        let mut server = Server::builder().build();
        server
            .route("GET", "/", index)
            .unwrap()
            .route("POST", "/", index)
            .unwrap();
        assert_eq!(server.tree().routes().len(), 2);

        let err = server.route("GET", "/", index).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_duplicate_shutdown_hook() {
        let mut server = Server::builder().build();
        server.on_shutdown("flush", || async {}).unwrap();
        let err = server.on_shutdown("flush", || async {}).unwrap_err();
        assert_eq!(err, ShutdownHookError::Duplicate("flush".to_string()));
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = HeronConfig::default();
        config.server.http_addr = "nowhere".to_string();
        assert!(matches!(
            Server::from_config(&config),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_applies_sections() {
        let mut config = HeronConfig::default();
        config.server.http_addr = "127.0.0.1:9999".to_string();
        config.session.sweep_interval_secs = 5;

        let server = Server::from_config(&config).unwrap();
        assert_eq!(server.http_addr(), "127.0.0.1:9999");
        assert_eq!(server.sweep_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_invalid_address() {
        let server = Server::builder().http_addr("not-a-valid-address").build();

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        match result {
            Err(ServerError::InvalidAddress { addr, .. }) => assert_eq!(addr, "not-a-valid-address"),
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_and_shutdown_runs_hooks() {
        let ran = Arc::new(AtomicBool::new(false));
        let mut server = Server::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();
        let flag = Arc::clone(&ran);
        server
            .on_shutdown("flag", move || async move {
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        assert!(result.unwrap().is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_plain_response() {
        let response = plain_response(StatusCode::GATEWAY_TIMEOUT, "Request dispatch timed out");
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
