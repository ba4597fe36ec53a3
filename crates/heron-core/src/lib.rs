//! # Heron Core
//!
//! Core types and contracts for the Heron server framework.
//!
//! - [`Request`] and [`ResponseWriter`] - the request/response pair seen by
//!   interceptors and handlers
//! - [`RequestContext`] - per-request state: server context, session, data bag
//! - [`ServerContext`] - server-wide properties, databases and templates
//! - [`SessionStore`] / [`SessionManager`] - cookie-keyed sessions
//! - [`StatusError`] / [`HandlerError`] - handler error types

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod request;
mod response;
mod server_context;
pub mod session;

pub use context::{RequestContext, RequestId};
pub use error::{DatabaseError, HandlerError, StatusError, TemplateError};
pub use request::{Request, RequestBuilder};
pub use response::ResponseWriter;
pub use server_context::{Database, DefaultServerContext, NoTemplates, ServerContext, TemplateRenderer};
pub use session::{spawn_sweeper, Session, SessionManager, SessionStore};
