//! Routes and interceptors, assembled before serving.

use std::sync::Arc;

use heron_middleware::{Interceptor, InterceptorChain};
use heron_router::{RouteError, RoutingTree};
use http::Method;
use tracing::debug;

use crate::handler::{Handler, HandlerDescriptor};

/// The routing tree of handler descriptors plus the interceptor chain.
///
/// Built through `&mut` registration, then frozen into a
/// [`Dispatcher`](crate::Dispatcher).
///
/// # Example
///
/// ```rust
/// use heron_server::HandlerTree;
/// use http::Method;
///
/// async fn index() -> &'static str {
///     "index.html"
/// }
///
/// let mut tree = HandlerTree::new();
/// tree.route("GET", "/", index).unwrap();
/// assert!(tree.lookup(&Method::GET, "/").is_some());
/// assert!(tree.route("GET", "/", index).is_err());
/// ```
#[derive(Debug, Default)]
pub struct HandlerTree {
    routes: RoutingTree<Arc<HandlerDescriptor>>,
    chain: InterceptorChain,
}

impl HandlerTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` at `path`.
    ///
    /// `method` is an HTTP method token or `*` for every method. A failed
    /// registration leaves the tree unchanged.
    pub fn route<H, Args>(&mut self, method: &str, path: &str, handler: H) -> Result<(), RouteError>
    where
        H: Handler<Args>,
        Args: 'static,
    {
        self.route_descriptor(method, path, Arc::new(HandlerDescriptor::new(handler)))
    }

    /// Registers an already built descriptor.
    pub fn route_descriptor(
        &mut self,
        method: &str,
        path: &str,
        descriptor: Arc<HandlerDescriptor>,
    ) -> Result<(), RouteError> {
        debug!(
            method = %method,
            path = %path,
            roles = ?descriptor.roles(),
            shapes = ?descriptor.shapes(),
            "registering route"
        );
        self.routes.register(method, path, descriptor)
    }

    /// Appends an interceptor to its phase.
    pub fn intercept<I: Interceptor>(&mut self, interceptor: I) {
        self.chain.push(interceptor);
    }

    /// Finds the descriptor for `method` and `path`.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Arc<HandlerDescriptor>> {
        self.routes.lookup(method, path)
    }

    /// Returns the interceptor chain.
    #[must_use]
    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    /// Returns the routing tree.
    #[must_use]
    pub fn routes(&self) -> &RoutingTree<Arc<HandlerDescriptor>> {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_extract::ParamRole;
    use heron_middleware::{FnInterceptor, Phase};

    async fn any() {}

    async fn by_request(_req: heron_core::Request) {}

    #[test]
    fn test_method_specific_beats_any() {
        let mut tree = HandlerTree::new();
        tree.route("*", "/items/*", any).unwrap();
        tree.route("DELETE", "/items/*", by_request).unwrap();

        let any_match = tree.lookup(&Method::GET, "/items/3").unwrap();
        assert!(any_match.roles().is_empty());

        let delete = tree.lookup(&Method::DELETE, "/items/3").unwrap();
        assert_eq!(delete.roles(), &[ParamRole::Request]);
    }

    #[test]
    fn test_invalid_method_rejected() {
        let mut tree = HandlerTree::new();
        let err = tree.route("GE T", "/", any).unwrap_err();
        assert!(matches!(err, RouteError::InvalidMethod(_)));
        assert!(tree.routes().is_empty());
    }

    #[test]
    fn test_interceptors_recorded() {
        let mut tree = HandlerTree::new();
        tree.intercept(FnInterceptor::before("auth", |_c, _r, _q| async { true }));
        assert_eq!(tree.chain().names(Phase::Before), vec!["auth"]);
    }
}
