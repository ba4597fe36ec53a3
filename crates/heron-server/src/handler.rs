//! Handler registration and binding plans.
//!
//! Any async function whose arguments implement
//! [`FromDispatch`](heron_extract::FromDispatch) and whose output implements
//! [`IntoOutputs`](heron_extract::IntoOutputs) is a [`Handler`]. At
//! registration it is erased into a [`HandlerDescriptor`] that records the
//! binding plan: the parameter roles in argument order and the declared
//! return shapes.
//!
//! # Example
//!
//! ```rust
//! use heron_core::Request;
//! use heron_extract::{Json, ParamRole, ReturnShape};
//! use heron_server::HandlerDescriptor;
//! use serde_json::{json, Value};
//!
//! async fn show_user(req: Request) -> Json<Value> {
//!     let id = req.segments().last().unwrap_or_default().to_string();
//!     Json(json!({ "id": id }))
//! }
//!
//! let descriptor = HandlerDescriptor::new(show_user);
//! assert_eq!(descriptor.roles(), &[ParamRole::Request]);
//! assert_eq!(descriptor.shapes(), &[ReturnShape::Structured]);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use heron_extract::{
    DispatchError, DispatchParts, FromDispatch, IntoOutputs, Output, ParamRole, ReturnShape,
};
use heron_middleware::BoxFuture;

/// An async function usable as a route handler.
///
/// Implemented for functions of up to four [`FromDispatch`] arguments.
/// `Args` is the tuple of argument types and only serves to tell the
/// implementations apart.
pub trait Handler<Args>: Send + Sync + 'static {
    /// The handler's return type.
    type Output: IntoOutputs;

    /// Returns the parameter roles in argument order.
    fn roles() -> Vec<ParamRole>;

    /// Binds every argument from `parts`, then awaits the handler.
    ///
    /// Binding stops at the first failing argument; the handler is then
    /// not invoked.
    fn call(&self, parts: DispatchParts) -> BoxFuture<'_, Result<Self::Output, DispatchError>>;
}

macro_rules! impl_handler {
    ($($A:ident),*) => {
        impl<F, Fut, R, $($A,)*> Handler<($($A,)*)> for F
        where
            F: Fn($($A),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: IntoOutputs,
            $($A: FromDispatch,)*
        {
            type Output = R;

            fn roles() -> Vec<ParamRole> {
                vec![$($A::ROLE),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(&self, parts: DispatchParts) -> BoxFuture<'_, Result<R, DispatchError>> {
                Box::pin(async move {
                    $(let $A = $A::bind(&parts)?;)*
                    Ok((self)($($A),*).await)
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);

type ErasedCall =
    Arc<dyn Fn(DispatchParts) -> BoxFuture<'static, Result<Vec<Output>, DispatchError>> + Send + Sync>;

/// A registered handler with its binding plan.
///
/// Immutable once built and shared read-only across requests.
#[derive(Clone)]
pub struct HandlerDescriptor {
    roles: Vec<ParamRole>,
    shapes: Vec<ReturnShape>,
    call: ErasedCall,
}

impl HandlerDescriptor {
    /// Erases `handler` and computes its binding plan.
    pub fn new<H, Args>(handler: H) -> Self
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let handler = Arc::new(handler);
        let call: ErasedCall = Arc::new(
            move |parts: DispatchParts| -> BoxFuture<'static, Result<Vec<Output>, DispatchError>> {
                let handler = Arc::clone(&handler);
                Box::pin(async move {
                    let output = handler.call(parts).await?;
                    Ok(output.into_outputs())
                })
            },
        );

        Self {
            roles: H::roles(),
            shapes: <H::Output as IntoOutputs>::shapes(),
            call,
        }
    }

    /// Returns the parameter roles in argument order.
    #[must_use]
    pub fn roles(&self) -> &[ParamRole] {
        &self.roles
    }

    /// Returns the declared return shapes.
    #[must_use]
    pub fn shapes(&self) -> &[ReturnShape] {
        &self.shapes
    }

    /// Binds the parameters, invokes the handler and flattens its result.
    pub fn call(&self, parts: DispatchParts) -> BoxFuture<'static, Result<Vec<Output>, DispatchError>> {
        (self.call)(parts)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("roles", &self.roles)
            .field("shapes", &self.shapes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{
        DefaultServerContext, Request, RequestContext, ResponseWriter, Session, StatusError,
    };
    use heron_extract::{Payload, Template};
    use serde::Deserialize;
    use std::time::Duration;

    fn parts(req: Request) -> DispatchParts {
        let ctx = RequestContext::new(
            Arc::new(DefaultServerContext::new()),
            Arc::new(Session::new("h", Duration::from_secs(60))),
        );
        DispatchParts::new(ctx, ResponseWriter::new(), req)
    }

    #[derive(Default, Deserialize)]
    struct Greeting {
        name: String,
    }

    async fn no_args() {}

    async fn all_roles(
        _resp: ResponseWriter,
        _ctx: RequestContext,
        _req: Request,
        Payload(body): Payload<Greeting>,
    ) -> Result<Template, StatusError> {
        if body.name.is_empty() {
            Err(StatusError::BAD_REQUEST)
        } else {
            Ok(Template::new("hello.html"))
        }
    }

    #[test]
    fn test_plan_for_unit_handler() {
        let descriptor = HandlerDescriptor::new(no_args);
        assert!(descriptor.roles().is_empty());
        assert_eq!(descriptor.shapes(), &[ReturnShape::Unit]);
    }

    #[test]
    fn test_plan_follows_argument_order() {
        let descriptor = HandlerDescriptor::new(all_roles);
        assert_eq!(
            descriptor.roles(),
            &[
                ParamRole::Response,
                ParamRole::Context,
                ParamRole::Request,
                ParamRole::Payload
            ]
        );
        assert_eq!(descriptor.shapes(), &[ReturnShape::Template, ReturnShape::Error]);
    }

    #[tokio::test]
    async fn test_call_binds_payload() {
        let descriptor = HandlerDescriptor::new(all_roles);
        let req = Request::builder()
            .method("POST")
            .uri("/hello")
            .header("content-type", "application/json")
            .body(r#"{"name":"ada"}"#)
            .unwrap();

        let outputs = descriptor.call(parts(req)).await.unwrap();
        assert!(matches!(&outputs[..], [Output::Template(name)] if name == "hello.html"));
    }

    #[tokio::test]
    async fn test_decode_failure_skips_handler() {
        let descriptor = HandlerDescriptor::new(all_roles);
        let req = Request::builder()
            .method("POST")
            .uri("/hello")
            .header("content-type", "application/json")
            .body("{")
            .unwrap();

        let err = descriptor.call(parts(req)).await.unwrap_err();
        assert!(matches!(err, DispatchError::BodyDecode { .. }));
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let descriptor = HandlerDescriptor::new(|req: Request| async move {
            req.path().as_bytes().to_vec()
        });
        let req = Request::builder().uri("/raw").body("").unwrap();

        let outputs = descriptor.call(parts(req)).await.unwrap();
        assert!(matches!(&outputs[..], [Output::Raw(b)] if b.as_ref() == b"/raw"));
        assert_eq!(descriptor.roles(), &[ParamRole::Request]);
    }
}
