//! Core interceptor trait and types.
//!
//! An [`Interceptor`] runs either before or after the handler for every
//! request it applies to. Its action returns `true` to continue and
//! `false` to stop the chain.
//!
//! # Example
//!
//! ```
//! use heron_middleware::{FnInterceptor, Interceptor, Phase};
//! use http::StatusCode;
//!
//! let auth = FnInterceptor::before("auth", |_ctx, resp, req| async move {
//!     if req.cookie("token").is_some() {
//!         true
//!     } else {
//!         resp.error("Forbidden", StatusCode::FORBIDDEN);
//!         false
//!     }
//! });
//!
//! assert_eq!(auth.phase(), Phase::Before);
//! assert_eq!(auth.name(), "auth");
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use heron_core::{Request, RequestContext, ResponseWriter};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased interceptor action.
///
/// Receives clones of the request context, response writer and request, so
/// the returned future can own them.
pub type InterceptorAction =
    Arc<dyn Fn(RequestContext, ResponseWriter, Request) -> BoxFuture<'static, bool> + Send + Sync>;

/// Erases an async closure into an [`InterceptorAction`].
pub fn action<F, Fut>(func: F) -> InterceptorAction
where
    F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    Arc::new(
        move |ctx: RequestContext, resp: ResponseWriter, req: Request| -> BoxFuture<'static, bool> {
            Box::pin(func(ctx, resp, req))
        },
    )
}

/// When an interceptor runs relative to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before route lookup and the handler.
    Before,
    /// After dispatch finished, including after handler errors.
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// A before- or after-handler hook.
///
/// `applies_to` is evaluated for every request; `run` is only awaited when
/// it returns true.
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the name used in logs.
    fn name(&self) -> &str;

    /// Returns the phase this interceptor belongs to.
    fn phase(&self) -> Phase;

    /// Returns true if this interceptor should run for `req`.
    fn applies_to(&self, req: &Request) -> bool;

    /// Runs the interceptor. Returning `false` stops the chain.
    fn run<'a>(
        &'a self,
        ctx: &'a RequestContext,
        resp: &'a ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, bool>;
}

/// An interceptor built from an async function, applying to every request.
pub struct FnInterceptor {
    name: String,
    phase: Phase,
    action: InterceptorAction,
}

impl FnInterceptor {
    /// Creates a function-based interceptor.
    pub fn new<F, Fut>(name: impl Into<String>, phase: Phase, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            name: name.into(),
            phase,
            action: action(func),
        }
    }

    /// Creates a before-phase interceptor.
    pub fn before<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(name, Phase::Before, func)
    }

    /// Creates an after-phase interceptor.
    pub fn after<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(RequestContext, ResponseWriter, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(name, Phase::After, func)
    }
}

impl fmt::Debug for FnInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Interceptor for FnInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn applies_to(&self, _req: &Request) -> bool {
        true
    }

    fn run<'a>(
        &'a self,
        ctx: &'a RequestContext,
        resp: &'a ResponseWriter,
        req: &'a Request,
    ) -> BoxFuture<'a, bool> {
        (self.action)(ctx.clone(), resp.clone(), req.clone())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use heron_core::{DefaultServerContext, Request, RequestContext, Session};

    pub fn context() -> RequestContext {
        RequestContext::new(
            Arc::new(DefaultServerContext::new()),
            Arc::new(Session::new("test", Duration::from_secs(60))),
        )
    }

    pub fn request(uri: &str) -> Request {
        Request::builder().uri(uri).body("").unwrap()
    }
}
