//! Trie nodes and registration-time conflict detection.
//!
//! Every node keeps its literal children in a map and at most one
//! *dynamic* child: a param, a regex or a wildcard node. Holding the three
//! kinds in a single slot makes "two differently typed dynamic siblings"
//! unrepresentable; a registration that would need a second one is rejected
//! with [`RouteError::AmbiguousRouteType`].

use std::collections::HashMap;
use std::fmt;

use crate::handler::BoxedHandler;
use crate::router::segment::SegmentKind;

/// One segment of one method's route tree.
pub struct Node {
    segment: String,
    kind: SegmentKind,
    static_children: HashMap<String, Node>,
    dynamic_child: Option<Box<Node>>,
    handler: Option<BoxedHandler>,
    route: Option<String>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self::new("/", SegmentKind::Static)
    }

    fn new(segment: &str, kind: SegmentKind) -> Self {
        Self {
            segment: segment.to_owned(),
            kind,
            static_children: HashMap::new(),
            dynamic_child: None,
            handler: None,
            route: None,
        }
    }

    /// The literal registration text of this level (`"/"` for the root).
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// The full registration path, once a handler is attached.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, SegmentKind::Wildcard)
    }

    pub(crate) fn static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children.get(segment)
    }

    pub(crate) fn dynamic_child(&self) -> Option<&Node> {
        self.dynamic_child.as_deref()
    }

    /// The child a registration segment lands on, if it already exists.
    ///
    /// `Err` carries the text of an incompatible dynamic sibling. Two dynamic
    /// segments are compatible only when their text is identical, i.e. same
    /// kind, same capture name and same pattern.
    pub(crate) fn existing_child(&self, segment: &str, kind: &SegmentKind) -> Result<Option<&Node>, &str> {
        if let SegmentKind::Static = kind {
            return Ok(self.static_children.get(segment));
        }
        match self.dynamic_child.as_deref() {
            Some(child) if child.segment == segment => Ok(Some(child)),
            Some(child) => Err(child.segment.as_str()),
            None => Ok(None),
        }
    }

    /// Descends into the child for `segment`, creating it if needed.
    ///
    /// Callers must have validated the segment with [`Node::existing_child`];
    /// an existing dynamic child is reused as is.
    pub(crate) fn child_or_create(&mut self, segment: &str, kind: SegmentKind) -> &mut Node {
        match kind {
            SegmentKind::Static => self
                .static_children
                .entry(segment.to_owned())
                .or_insert_with(|| Node::new(segment, SegmentKind::Static)),
            kind => &mut **self
                .dynamic_child
                .get_or_insert_with(|| Box::new(Node::new(segment, kind))),
        }
    }

    /// Attaches `handler`, returning the one it replaced.
    pub(crate) fn bind(&mut self, route: &str, handler: BoxedHandler) -> Option<BoxedHandler> {
        self.route = Some(route.to_owned());
        self.handler.replace(handler)
    }

    /// Depth-first walk over every node carrying a handler.
    pub(crate) fn for_each_route<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        if let Some(route) = self.route.as_deref() {
            f(route);
        }
        for child in self.static_children.values() {
            child.for_each_route(f);
        }
        if let Some(child) = self.dynamic_child.as_deref() {
            child.for_each_route(f);
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("segment", &self.segment)
            .field("kind", &self.kind.label())
            .field("route", &self.route)
            .field("static_children", &self.static_children.keys().collect::<Vec<_>>())
            .field("dynamic_child", &self.dynamic_child.as_ref().map(|c| &c.segment))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::segment::classify;

    fn kind(segment: &str) -> SegmentKind {
        classify(segment).unwrap()
    }

    #[test]
    fn static_children_are_reused_by_text() {
        let mut root = Node::root();
        root.child_or_create("a", kind("a"));
        root.child_or_create("a", kind("a"));
        root.child_or_create("b", kind("b"));
        assert_eq!(root.static_children.len(), 2);
        assert!(root.existing_child("a", &kind("a")).unwrap().is_some());
        assert!(root.existing_child("c", &kind("c")).unwrap().is_none());
    }

    #[test]
    fn static_and_dynamic_children_coexist() {
        let mut root = Node::root();
        root.child_or_create("a", kind("a"));
        root.child_or_create(":id", kind(":id"));
        assert!(root.static_child("a").is_some());
        assert_eq!(root.dynamic_child().map(Node::segment), Some(":id"));
    }

    #[test]
    fn only_identical_dynamic_segments_are_compatible() {
        let mut root = Node::root();
        root.child_or_create(":id", kind(":id"));

        assert!(root.existing_child(":id", &kind(":id")).unwrap().is_some());
        assert_eq!(root.existing_child(":name", &kind(":name")).unwrap_err(), ":id");
        assert_eq!(root.existing_child("*", &kind("*")).unwrap_err(), ":id");
        assert_eq!(
            root.existing_child(":id([0-9]+)", &kind(":id([0-9]+)")).unwrap_err(),
            ":id"
        );
    }

    #[test]
    fn walks_bound_routes() {
        let mut root = Node::root();
        let noop = crate::handler::boxed(|ctx: crate::Context| async move { ctx });
        root.child_or_create("a", kind("a"))
            .bind("/a", noop.clone());
        root.child_or_create("a", kind("a"))
            .child_or_create("*", kind("*"))
            .bind("/a/*", noop);

        let mut seen = Vec::new();
        root.for_each_route(&mut |r| seen.push(r));
        seen.sort();
        assert_eq!(seen, ["/a", "/a/*"]);
    }
}
