//! Handler parameter binding.
//!
//! Each handler argument type implements [`FromDispatch`]. Its
//! [`ROLE`](FromDispatch::ROLE) is recorded once when the handler is
//! registered; [`bind`](FromDispatch::bind) runs per request, in argument
//! order.

use std::fmt;

use heron_core::{Request, RequestContext, ResponseWriter};

use crate::error::DispatchError;

/// What a handler parameter is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRole {
    /// The live [`ResponseWriter`].
    Response,
    /// The per-request [`RequestContext`].
    Context,
    /// The inbound [`Request`].
    Request,
    /// A value decoded from the request body.
    Payload,
}

impl fmt::Display for ParamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => f.write_str("response"),
            Self::Context => f.write_str("context"),
            Self::Request => f.write_str("request"),
            Self::Payload => f.write_str("payload"),
        }
    }
}

/// Everything a parameter can be bound from.
#[derive(Debug, Clone)]
pub struct DispatchParts {
    ctx: RequestContext,
    resp: ResponseWriter,
    req: Request,
}

impl DispatchParts {
    /// Bundles the per-request handles.
    #[must_use]
    pub fn new(ctx: RequestContext, resp: ResponseWriter, req: Request) -> Self {
        Self { ctx, resp, req }
    }

    /// Returns the request context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Returns the response writer.
    #[must_use]
    pub fn response(&self) -> &ResponseWriter {
        &self.resp
    }

    /// Returns the request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.req
    }
}

/// A type that can be bound as a handler parameter.
///
/// # Example
///
/// ```
/// use heron_core::{Request, ResponseWriter};
/// use heron_extract::{FromDispatch, ParamRole};
///
/// assert_eq!(<ResponseWriter as FromDispatch>::ROLE, ParamRole::Response);
/// assert_eq!(<Request as FromDispatch>::ROLE, ParamRole::Request);
/// ```
pub trait FromDispatch: Sized + Send + 'static {
    /// The role recorded in the handler's binding plan.
    const ROLE: ParamRole;

    /// Binds the parameter for one request.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the value cannot be produced; the
    /// handler is then not invoked.
    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError>;
}

impl FromDispatch for ResponseWriter {
    const ROLE: ParamRole = ParamRole::Response;

    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError> {
        Ok(parts.resp.clone())
    }
}

impl FromDispatch for RequestContext {
    const ROLE: ParamRole = ParamRole::Context;

    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError> {
        Ok(parts.ctx.clone())
    }
}

impl FromDispatch for Request {
    const ROLE: ParamRole = ParamRole::Request;

    fn bind(parts: &DispatchParts) -> Result<Self, DispatchError> {
        Ok(parts.req.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{DefaultServerContext, Session};
    use http::StatusCode;
    use std::sync::Arc;
    use std::time::Duration;

    fn parts() -> DispatchParts {
        let ctx = RequestContext::new(
            Arc::new(DefaultServerContext::new().with_property("site", "heron")),
            Arc::new(Session::new("s1", Duration::from_secs(60))),
        );
        let req = Request::builder().uri("/users/7").body("").unwrap();
        DispatchParts::new(ctx, ResponseWriter::new(), req)
    }

    #[test]
    fn test_bound_handles_share_state() {
        let parts = parts();

        let writer = ResponseWriter::bind(&parts).unwrap();
        writer.set_status(StatusCode::ACCEPTED);
        assert_eq!(parts.response().status(), Some(StatusCode::ACCEPTED));

        let ctx = RequestContext::bind(&parts).unwrap();
        ctx.insert("seen", true);
        assert_eq!(parts.context().get("seen"), Some(true.into()));
        assert_eq!(ctx.server().property("site"), Some("heron"));
    }

    #[test]
    fn test_request_binding() {
        let parts = parts();
        let req = Request::bind(&parts).unwrap();
        assert_eq!(req.path(), "/users/7");
    }

    #[test]
    fn test_roles() {
        assert_eq!(<RequestContext as FromDispatch>::ROLE, ParamRole::Context);
        assert_eq!(ParamRole::Payload.to_string(), "payload");
    }
}
