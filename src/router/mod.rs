//! Segment-trie request router.
//!
//! One tree per HTTP method, one node per path segment. Trees are built once
//! at startup and only read afterwards, so a `Router` behind an `Arc` serves
//! any number of concurrent lookups without locking.
//!
//! Path grammar:
//!
//! ```text
//! path    := "/" | ("/" segment)+
//! segment := static | ":" name | ":" name "(" pattern ")" | "*"
//! ```
//!
//! Request segments resolve with a fixed precedence, most specific first:
//! static, then regex, then param, then wildcard.

mod matcher;
mod node;
mod segment;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::handler::Handler;
use crate::method::Method;

pub use matcher::MatchInfo;
pub use node::Node;
pub use segment::SegmentKind;

use segment::{SegmentError, classify};

/// The application router.
///
/// Registration is fallible: every `add_route` or fluent registration call
/// returns a [`RouteError`] for malformed paths and conflicting routes, which
/// a well-behaved caller treats as fatal to startup.
///
/// ```rust
/// # use trellis::{Context, Router, RouteError};
/// # async fn list(ctx: Context) -> Context { ctx }
/// # async fn show(ctx: Context) -> Context { ctx }
/// # fn main() -> Result<(), RouteError> {
/// let router = Router::new()
///     .get("/users", list)?
///     .get("/users/:id([0-9]+)", show)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Router {
    trees: HashMap<Method, Node>,
}

impl Router {
    pub fn new() -> Self {
        Self { trees: HashMap::new() }
    }

    /// Registers `handler` for `method` + `path`.
    ///
    /// Registration is all-or-nothing: the path is classified and checked
    /// against the existing tree before any node is created.
    pub fn add_route(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<(), RouteError> {
        validate_path(path)?;

        let segments = if path == "/" {
            Vec::new()
        } else {
            path[1..]
                .split('/')
                .map(|s| classify(s).map(|kind| (s, kind)).map_err(|e| segment_error(path, s, e)))
                .collect::<Result<Vec<_>, _>>()?
        };

        let root = self.trees.entry(method).or_insert_with(Node::root);

        let mut node: &Node = root;
        for (segment, kind) in &segments {
            match node.existing_child(segment, kind) {
                Ok(Some(child)) => node = child,
                Ok(None) => break,
                Err(existing) => {
                    return Err(RouteError::AmbiguousRouteType {
                        path: path.to_owned(),
                        segment: (*segment).to_owned(),
                        existing: existing.to_owned(),
                    });
                }
            }
        }

        let mut node = root;
        for (segment, kind) in segments {
            node = node.child_or_create(segment, kind);
        }
        if node.handler().is_some() && !node.is_wildcard() {
            return Err(RouteError::RouteConflict { method, path: path.to_owned() });
        }

        if node.bind(path, handler.into_boxed_handler()).is_some() {
            warn!(%method, route = path, "wildcard route re-registered, previous handler replaced");
        } else {
            debug!(%method, route = path, "route registered");
        }
        Ok(())
    }

    /// Fluent form of [`Router::add_route`].
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.add_route(method, path, handler)?;
        Ok(self)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.route(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.route(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.route(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.route(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Result<Self, RouteError> {
        self.route(Method::Delete, path, handler)
    }

    /// Resolves `path` in the tree of `method`.
    ///
    /// `None` means no node matches. A `Some` whose
    /// [`handler`](MatchInfo::handler) is `None` is a node on the way to a
    /// registered route, and callers treat it as not found as well.
    pub fn find_route(&self, method: Method, path: &str) -> Option<MatchInfo<'_>> {
        matcher::find(self.trees.get(&method)?, path)
    }

    /// Every registered `(method, route template)` pair, for diagnostics.
    /// Order is unspecified.
    pub fn routes(&self) -> Vec<(Method, &str)> {
        let mut out = Vec::new();
        for (method, root) in &self.trees {
            root.for_each_route(&mut |route| out.push((*method, route)));
        }
        out
    }
}

fn validate_path(path: &str) -> Result<(), RouteError> {
    let reason = if path.is_empty() {
        "path is empty"
    } else if !path.starts_with('/') {
        "path must start with `/`"
    } else if path != "/" && path.ends_with('/') {
        "path must not end with `/`"
    } else {
        return Ok(());
    };
    Err(RouteError::MalformedPath { path: path.to_owned(), reason })
}

fn segment_error(path: &str, segment: &str, err: SegmentError) -> RouteError {
    match err {
        SegmentError::Empty => RouteError::MalformedPath {
            path: path.to_owned(),
            reason: "empty segment",
        },
        SegmentError::EmptyName => RouteError::MalformedPath {
            path: path.to_owned(),
            reason: "empty parameter name",
        },
        SegmentError::Pattern(source) => RouteError::InvalidPattern {
            path: path.to_owned(),
            segment: segment.to_owned(),
            source,
        },
    }
}
