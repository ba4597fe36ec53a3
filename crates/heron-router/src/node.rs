//! Prefix tree node implementation.
//!
//! Each node stands for one path segment. Wildcard segments (`*`, `**`) are
//! stored under their literal key and only interpreted during lookup.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use http::Method;
use smallvec::SmallVec;

use crate::error::RouteError;
use crate::method::MethodKey;

/// Segment key matching exactly one trailing path segment.
pub const SINGLE_WILDCARD: &str = "*";

/// Segment key matching every remaining path segment.
pub const DEEP_WILDCARD: &str = "**";

/// Segments stored inline before spilling to the heap.
const INLINE_SEGMENTS: usize = 8;

/// A node in the routing tree.
///
/// Nodes are created lazily while routes are registered and never removed.
/// A node owns its children; the [`RoutingTree`](crate::RoutingTree) owns
/// the root.
#[derive(Debug, Clone)]
pub struct RouteNode<H> {
    /// Full accumulated path from the root ("" for the root)
    path_prefix: String,

    /// The single segment this node represents ("" for the root)
    segment_key: String,

    /// Handlers bound on this node, one per method key
    handlers: HashMap<MethodKey, H>,

    /// Children keyed by literal segment, `*` or `**`
    children: HashMap<String, RouteNode<H>>,
}

impl<H> Default for RouteNode<H> {
    fn default() -> Self {
        Self::root()
    }
}

impl<H> RouteNode<H> {
    /// Creates a root node.
    #[must_use]
    pub fn root() -> Self {
        Self {
            path_prefix: String::new(),
            segment_key: String::new(),
            handlers: HashMap::new(),
            children: HashMap::new(),
        }
    }

    fn child_of(parent_prefix: &str, key: &str) -> Self {
        Self {
            path_prefix: format!("{parent_prefix}/{key}"),
            segment_key: key.to_string(),
            handlers: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Returns the accumulated path of this node.
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Returns the segment this node represents.
    #[must_use]
    pub fn segment_key(&self) -> &str {
        &self.segment_key
    }

    /// Returns true if this node is a `*` or `**` node.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.segment_key == SINGLE_WILDCARD || self.segment_key == DEEP_WILDCARD
    }

    /// Returns the direct child stored under `key`, without wildcard matching.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        self.children.get(key)
    }

    /// Iterates over the direct children in no particular order.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.values()
    }

    /// Iterates over the method keys bound on this node.
    pub fn methods(&self) -> impl Iterator<Item = &MethodKey> {
        self.handlers.keys()
    }

    /// Returns true if at least one handler is bound on this node.
    #[must_use]
    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Binds `handler` at `method` for `full_path`, creating nodes as needed.
    ///
    /// `full_path` is interpreted relative to the root even when called on
    /// an inner node, so it must start with this node's prefix. Empty
    /// segments (`//`, trailing `/`) are ignored.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PrefixMismatch`] if `full_path` is not under this node
    /// - [`RouteError::Duplicate`] if `method` is already bound at the target
    ///
    /// A failed registration leaves the tree unchanged.
    pub fn register(
        &mut self,
        method: MethodKey,
        full_path: &str,
        handler: H,
    ) -> Result<(), RouteError> {
        let full_path = if full_path.starts_with('/') {
            full_path.to_string()
        } else {
            format!("/{full_path}")
        };

        let remainder = full_path
            .strip_prefix(self.path_prefix.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| RouteError::PrefixMismatch {
                prefix: self.path_prefix.clone(),
                path: full_path.clone(),
            })?;

        let segments: SmallVec<[&str; INLINE_SEGMENTS]> =
            remainder.split('/').filter(|s| !s.is_empty()).collect();

        if segments.is_empty() {
            return self.bind(method, handler);
        }

        // Duplicates can only exist on nodes that already exist, so nodes
        // created here are never left behind by a failed bind.
        let mut node = self;
        for segment in segments {
            let parent_prefix = node.path_prefix.clone();
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| Self::child_of(&parent_prefix, segment));
        }

        let canonical = node.path_prefix.clone();
        node.register(method, &canonical, handler)
    }

    fn bind(&mut self, method: MethodKey, handler: H) -> Result<(), RouteError> {
        match self.handlers.entry(method) {
            Entry::Occupied(existing) => Err(RouteError::Duplicate {
                method: existing.key().to_string(),
                path: if self.path_prefix.is_empty() {
                    "/".to_string()
                } else {
                    self.path_prefix.clone()
                },
            }),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Resolves `path` to the node that serves it.
    ///
    /// One leading `/` and any query string are ignored. At each level a
    /// literal child wins over `*`, which wins over `**`:
    ///
    /// - a literal child is descended into with the rest of the path
    ///   (no backtracking if that descent fails)
    /// - `*` matches only when the current segment is the last one
    /// - `**` matches the current segment and everything beneath it
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Self> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.split_once('?').map_or(path, |(path, _)| path);

        if is_terminal(path) {
            return Some(self);
        }

        let (key, rest) = path.split_once('/').unwrap_or((path, ""));

        if let Some(child) = self.children.get(key) {
            return child.resolve(rest);
        }

        if is_terminal(rest) {
            if let Some(child) = self.children.get(SINGLE_WILDCARD) {
                return Some(child);
            }
        }

        self.children.get(DEEP_WILDCARD)
    }

    /// Returns the handler for `method`, falling back to the `*` binding.
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&H> {
        self.handlers
            .get(&MethodKey::Exact(method.clone()))
            .or_else(|| self.handlers.get(&MethodKey::Any))
    }
}

fn is_terminal(path: &str) -> bool {
    path.is_empty() || path == "/"
}
