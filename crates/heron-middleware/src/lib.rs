//! # Heron Middleware
//!
//! Before/after interceptors for the Heron framework.
//!
//! Interceptors are grouped by [`Phase`] into an [`InterceptorChain`]:
//!
//! ```text
//! request ─► before[0] ─► before[1] ─► … ─► handler ─► after[0] ─► after[1] ─► …
//!               │             │
//!             false         false   ─► stop: no handler, no after-phase
//! ```
//!
//! Within a phase, interceptors run in registration order. Each one is
//! skipped unless [`Interceptor::applies_to`] accepts the request.
//!
//! - [`FnInterceptor`] applies to every request
//! - [`PathInterceptor`] applies by path prefix, exact path, or a custom check

#![doc(html_root_url = "https://docs.rs/heron-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod interceptor;
mod path;

pub use chain::{BoxedInterceptor, InterceptorChain};
pub use interceptor::{action, BoxFuture, FnInterceptor, Interceptor, InterceptorAction, Phase};
pub use path::PathInterceptor;
