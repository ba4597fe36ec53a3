//! High-level routing tree API.

use http::Method;

use crate::error::RouteError;
use crate::method::MethodKey;
use crate::node::RouteNode;

/// A routing tree keyed by path segment.
///
/// The tree is built once during startup and only read afterwards, so it
/// can be shared across request tasks without locking.
///
/// # Example
///
/// ```rust
/// use heron_router::RoutingTree;
/// use http::Method;
///
/// let mut tree = RoutingTree::new();
/// tree.register("GET", "/users", "listUsers").unwrap();
/// tree.register("GET", "/users/*", "getUser").unwrap();
/// tree.register("*", "/static/**", "assets").unwrap();
///
/// assert_eq!(tree.lookup(&Method::GET, "/users/42"), Some(&"getUser"));
/// assert_eq!(tree.lookup(&Method::HEAD, "/static/css/site.css"), Some(&"assets"));
/// assert_eq!(tree.lookup(&Method::POST, "/users"), None);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingTree<H> {
    /// Root node of the tree
    root: RouteNode<H>,
    /// Number of successful registrations
    route_count: usize,
}

impl<H> Default for RoutingTree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RoutingTree<H> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: RouteNode::root(),
            route_count: 0,
        }
    }

    /// Registers `handler` for `method` at `path`.
    ///
    /// `method` is an HTTP method name or `*` for every method without a
    /// more specific binding.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidMethod`] for a malformed method string
    /// - [`RouteError::Duplicate`] if the method is already bound at `path`
    pub fn register(&mut self, method: &str, path: &str, handler: H) -> Result<(), RouteError> {
        let key = MethodKey::parse(method)?;
        self.root.register(key, path, handler)?;
        self.route_count += 1;
        Ok(())
    }

    /// Resolves the node serving `path`, if any.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteNode<H>> {
        self.root.resolve(path)
    }

    /// Resolves `path` and returns the handler bound for `method`.
    ///
    /// A missing path and a path without a handler for `method` are not
    /// distinguished.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&H> {
        self.resolve(path)?.handler(method)
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &RouteNode<H> {
        &self.root
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
