//! # Heron
//!
//! **An embeddable HTTP server framework**
//!
//! - Path-segment routing tree with `*` (one segment) and `**` (any
//!   remainder) wildcards and per-method handlers
//! - Before/after interceptor chain, with path-prefix interceptors
//! - Handlers are plain async functions; parameters are bound by type and
//!   return values are written by shape (template name, JSON, raw bytes,
//!   errors)
//! - Cookie-keyed in-memory sessions and `.properties` server properties
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use heron::prelude::*;
//! use serde_json::{json, Value};
//!
//! async fn show_user(req: Request) -> Result<Json<Value>, StatusError> {
//!     let id = req.segments().last().ok_or(StatusError::NOT_FOUND)?;
//!     Ok(Json(json!({ "id": id })))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("HERON").load()?;
//!     heron::telemetry::init(&config)?;
//!
//!     let mut server = Server::from_config(&config)?;
//!     server.route("GET", "/users/*", show_user)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → Session → Before interceptors → Route → Bind → Handler
//!                                                            ↓
//! Response ← After interceptors ← Error translation ← Write outputs
//! ```

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export configuration types
pub use heron_config as config;

// Re-export core types
pub use heron_core as core;

// Re-export parameter binding and output types
pub use heron_extract as extract;

// Re-export interceptor types
pub use heron_middleware as middleware;

// Re-export the routing tree
pub use heron_router as router;

// Re-export server types
pub use heron_server as server;

// Re-export logging and metrics setup
pub use heron_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
///
/// async fn index() -> Template {
///     Template::new("index.html")
/// }
///
/// let mut server = Server::builder().build();
/// server.route("GET", "/", index).unwrap();
/// ```
pub mod prelude {
    pub use heron_config::{ConfigLoader, HeronConfig};

    pub use heron_core::{
        HandlerError, Request, RequestContext, ResponseWriter, ServerContext, Session,
        StatusError,
    };

    pub use heron_extract::{Checker, Json, Payload, Template, Valid, Validate};

    pub use heron_middleware::{FnInterceptor, Interceptor, PathInterceptor, Phase};

    pub use heron_server::{Server, ShutdownSignal};
}
