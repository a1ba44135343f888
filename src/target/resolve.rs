//! Target resolution and relatives lookup.
//!
//! Hit-testing walks every element under the pointer (not just the topmost
//! one) so disabled form controls, which ignore pointer events, are still
//! found. The controller's own surfaces are skipped.

use std::cmp::Ordering;

use crate::capture::roles::{is_semantic_interactive, MAX_ANCESTOR_DEPTH};
use crate::geometry::Point;
use crate::host::{NodeId, PageHost};

/// True for the document root and body, which are never capture targets.
pub fn is_root_or_body(host: &dyn PageHost, node: NodeId) -> bool {
    Some(node) == host.document_element() || Some(node) == host.body()
}

/// Resolve the element under `point`.
///
/// The first candidate that is not one of our own surface nodes wins; if that
/// candidate is the root or body there is no target.
pub fn resolve_at(host: &dyn PageHost, point: Point) -> Option<NodeId> {
    let candidate = host
        .elements_from_point(point)
        .into_iter()
        .find(|node| !host.owns_node(*node))?;
    if is_root_or_body(host, candidate) {
        None
    } else {
        Some(candidate)
    }
}

/// Parent of `node`, unless that parent is the root or body.
pub fn capturable_parent(host: &dyn PageHost, node: NodeId) -> Option<NodeId> {
    host.parent(node)
        .filter(|parent| !is_root_or_body(host, *parent))
}

/// Closest element, `node` included, that is a semantic interactive target.
pub fn semantic_ancestor(host: &dyn PageHost, node: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let el = current?;
        if is_root_or_body(host, el) {
            return None;
        }
        if is_semantic_interactive(host, el) {
            return Some(el);
        }
        current = host.parent(el);
    }
    None
}

/// Direct children worth offering as capture targets.
///
/// Children need a positive area and must visually intersect the parent's
/// box. The largest come first; at most `limit` are returned.
pub fn child_candidates(host: &dyn PageHost, node: NodeId, limit: usize) -> Vec<NodeId> {
    let Some(parent_box) = host.bounding_rect(node) else {
        return Vec::new();
    };
    let mut ranked: Vec<(NodeId, f64)> = host
        .children(node)
        .into_iter()
        .filter(|child| !host.owns_node(*child))
        .filter_map(|child| {
            let rect = host.bounding_rect(child)?;
            (rect.has_area() && rect.intersects(&parent_box)).then_some((child, rect.area()))
        })
        .collect();
    // Stable sort keeps document order among equal areas
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(limit).map(|(child, _)| child).collect()
}
