//! # Heron Server
//!
//! Dispatch engine and HTTP transport for the Heron framework.
//!
//! - [`HandlerTree`] - routes and interceptors, assembled by `&mut`
//!   registration
//! - [`Dispatcher`] - the frozen request pipeline: session sync, before
//!   interceptors, routing, handler invocation, output writing, error
//!   translation, after interceptors
//! - [`Server`] - Hyper/Tokio HTTP/1.1 transport with graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use heron_core::{Request, StatusError};
//! use heron_extract::Json;
//! use heron_server::Server;
//! use serde_json::{json, Value};
//!
//! async fn show_user(req: Request) -> Result<Json<Value>, StatusError> {
//!     match req.segments().last() {
//!         Some(id) if !id.is_empty() => Ok(Json(json!({ "id": id }))),
//!         _ => Err(StatusError::NOT_FOUND),
//!     }
//! }
//!
//! let mut server = Server::builder().http_addr("127.0.0.1:8080").build();
//! server.route("GET", "/users/*", show_user).unwrap();
//! ```

#![doc(html_root_url = "https://docs.rs/heron-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
mod error;
mod handler;
mod server;
pub mod shutdown;
mod tree;

pub use dispatch::Dispatcher;
pub use error::{ServerError, ShutdownHookError};
pub use handler::{Handler, HandlerDescriptor};
pub use server::{HttpResponse, ResponseBody, Server, ServerBuilder};
pub use shutdown::{ShutdownHooks, ShutdownSignal};
pub use tree::HandlerTree;
