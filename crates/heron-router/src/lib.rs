//! Path-segment routing tree for Heron.
//!
//! Routes are stored in a prefix tree where every node represents one path
//! segment and holds handlers per HTTP method. Two wildcard segments are
//! understood during lookup:
//!
//! - `*` matches exactly one segment, and only as the last one
//! - `**` matches every remaining segment
//!
//! At each level a literal segment wins over `*`, which wins over `**`.
//!
//! # Example
//!
//! ```rust
//! use heron_router::RoutingTree;
//! use http::Method;
//!
//! let mut tree = RoutingTree::new();
//! tree.register("GET", "/a/*", "single").unwrap();
//! tree.register("GET", "/a/**", "deep").unwrap();
//!
//! assert_eq!(tree.lookup(&Method::GET, "/a/b"), Some(&"single"));
//! assert_eq!(tree.lookup(&Method::GET, "/a/b/c"), Some(&"deep"));
//! assert_eq!(tree.lookup(&Method::GET, "/a"), None);
//! ```
//!
//! # Architecture
//!
//! ```text
//!                 (root)
//!                   │
//!          ┌────────┴────────┐
//!        "users"          "static"
//!       [GET,POST]           │
//!          │               "**"
//!         "*"              [*]
//!        [GET]
//! ```

mod error;
mod method;
mod node;
mod tree;

pub use error::RouteError;
pub use method::{MethodKey, ANY_METHOD};
pub use node::{RouteNode, DEEP_WILDCARD, SINGLE_WILDCARD};
pub use tree::RoutingTree;
