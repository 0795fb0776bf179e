//! Request-time traversal of a route tree.
//!
//! Each request segment is resolved with a fixed precedence:
//! static > regex > param > wildcard. Once the walk has passed through a
//! wildcard node, that wildcard owns the rest of the path: if a deeper
//! segment misses, or the walk ends on a node without a handler, the
//! deepest wildcard reached is the result, with the params bound up to it.

use std::collections::HashMap;

use crate::handler::BoxedHandler;
use crate::router::node::Node;
use crate::router::segment::SegmentKind;

/// The node a request path resolved to, plus its bound path parameters.
///
/// A resolved node need not carry a handler (`/a` resolves when only `/a/b`
/// is registered); callers treat [`MatchInfo::handler`] returning `None` as
/// not found.
#[derive(Debug)]
pub struct MatchInfo<'r> {
    node: &'r Node,
    params: HashMap<String, String>,
}

impl<'r> MatchInfo<'r> {
    pub fn node(&self) -> &'r Node {
        self.node
    }

    pub fn handler(&self) -> Option<&'r BoxedHandler> {
        self.node.handler()
    }

    /// The registration path of the matched route.
    pub fn route(&self) -> Option<&'r str> {
        self.node.route()
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }
}

/// Resolves one request segment below `node`.
///
/// Returns the child and whether it binds the segment to a capture name.
fn child_of<'r>(node: &'r Node, segment: &str) -> Option<(&'r Node, bool)> {
    if let Some(child) = node.static_child(segment) {
        return Some((child, false));
    }
    let child = node.dynamic_child()?;
    match child.kind() {
        SegmentKind::Regex { pattern, .. } if !segment.is_empty() && pattern.is_match(segment) => {
            Some((child, true))
        }
        SegmentKind::Param { .. } if !segment.is_empty() => Some((child, true)),
        SegmentKind::Wildcard => Some((child, false)),
        _ => None,
    }
}

/// Walks `root` along `path`. Leading and trailing slashes are ignored, so
/// `/a/b/` resolves like `/a/b`.
pub(crate) fn find<'r>(root: &'r Node, path: &str) -> Option<MatchInfo<'r>> {
    let trimmed = path.trim_matches('/');
    let mut info = MatchInfo { node: root, params: HashMap::new() };
    if trimmed.is_empty() {
        return Some(info);
    }

    // Deepest wildcard passed so far, with the params bound up to it.
    let mut wildcard: Option<MatchInfo<'r>> = None;

    for segment in trimmed.split('/') {
        let Some((child, binds)) = child_of(info.node, segment) else {
            return wildcard;
        };
        if binds {
            if let Some(name) = child.kind().capture_name() {
                info.params.insert(name.to_owned(), segment.to_owned());
            }
        }
        info.node = child;
        if child.is_wildcard() {
            wildcard = Some(MatchInfo { node: child, params: info.params.clone() });
        }
    }

    match wildcard {
        Some(wildcard) if info.node.handler().is_none() => Some(wildcard),
        _ => Some(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::segment::classify;

    fn tree(routes: &[&str]) -> Node {
        let mut root = Node::root();
        for route in routes {
            let mut node = &mut root;
            for segment in route.trim_start_matches('/').split('/') {
                let kind = classify(segment).unwrap();
                node = node.child_or_create(segment, kind);
            }
            node.bind(route, crate::handler::boxed(|ctx: crate::Context| async move { ctx }));
        }
        root
    }

    fn resolve<'r>(root: &'r Node, path: &str) -> Option<(&'r str, HashMap<String, String>)> {
        let m = find(root, path)?;
        m.handler()?;
        Some((m.route()?, m.into_params()))
    }

    #[test]
    fn wildcard_keeps_params_bound_before_it() {
        let root = tree(&["/u/:id/*", "/u/:id/*/:tab"]);

        let (route, params) = resolve(&root, "/u/7/files/readme").unwrap();
        assert_eq!(route, "/u/:id/*/:tab");
        assert_eq!(params.get("tab").map(String::as_str), Some("readme"));

        // `:tab` binds `a` before `b` misses; only `id` survives the fallback.
        let (route, params) = resolve(&root, "/u/7/files/a/b").unwrap();
        assert_eq!(route, "/u/:id/*");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn deepest_wildcard_wins() {
        let root = tree(&["/a/*", "/a/*/b/*"]);
        assert_eq!(resolve(&root, "/a/x/b/y/z").map(|(r, _)| r), Some("/a/*/b/*"));
        assert_eq!(resolve(&root, "/a/x/c/y").map(|(r, _)| r), Some("/a/*"));
        assert_eq!(resolve(&root, "/a/x/b").map(|(r, _)| r), Some("/a/*"));
    }

    #[test]
    fn no_wildcard_on_the_path_means_no_fallback() {
        let root = tree(&["/f/*", "/f/readme"]);
        assert!(find(&root, "/f/readme/more").is_none());
        assert_eq!(resolve(&root, "/f/other/more").map(|(r, _)| r), Some("/f/*"));
    }
}
