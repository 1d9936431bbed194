//! `Pointer` edges — an arbitrary named, optionally ordered reference
//! from one node to another. Uniqueness is deliberately not enforced
//! here; that's left to callers.
//!
//! Ordering: when some siblings carry an explicit `order` and others
//! don't, ordered siblings sort first (ascending), and the unordered
//! remainder keep their insertion order after them. See DESIGN.md.

use crate::builder::EdgeCreationAttributes;
use crate::error::{Result, VisitResult};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};

pub const TID: EdgeKind = EdgeKind::POINTER;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build() -> EdgeCreationAttributes {
    EdgeCreationAttributes::new(TID)
}

pub fn add_pointer(
    view: &mut GraphView,
    source: NodeId,
    target: NodeId,
    identifier: Option<String>,
    order: Option<u32>,
) -> Result<EdgeId> {
    let mut builder = build();
    if let Some(identifier) = identifier {
        builder = builder.with_name(identifier);
    }
    if let Some(order) = order {
        builder = builder.with_order(order);
    }
    builder.insert_edge(view, source, target)
}

pub fn get_referenced_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.target())
}

pub fn get_order(edge: BoundEdge<'_>) -> Option<u32> {
    edge.order()
}

/// Every pointer edge out of `node`, ordered siblings first (ascending by
/// `order`), then unordered siblings in insertion order.
fn ordered_pointer_edges(view: &GraphView, node: NodeId) -> Vec<EdgeId> {
    let mut edges: Vec<EdgeId> = view.iter_out_edges(node, Some(TID)).collect();
    edges.sort_by_key(|&id| {
        let order = view.edge(id).order();
        // `order.is_none()` sorts after `Some(_)` at any value, and ties
        // within each group preserve petgraph's insertion-order iteration
        // because `sort_by_key` is stable.
        (order.is_none(), order.unwrap_or(0))
    });
    edges
}

pub fn visit_pointed_edges(
    node: BoundNode<'_>,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    for edge_id in ordered_pointer_edges(node.view(), node.id()) {
        match f(node.view().bind_edge(edge_id)) {
            VisitResult::Continue => continue,
            other => return other,
        }
    }
    VisitResult::Continue
}

pub fn visit_pointed_edges_with_identifier(
    node: BoundNode<'_>,
    identifier: &str,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    visit_pointed_edges(node, |edge| {
        if edge.name() == Some(identifier) {
            f(edge)
        } else {
            VisitResult::Continue
        }
    })
}

pub fn get_pointed_node_by_identifier<'g>(
    view: &'g GraphView,
    node: NodeId,
    identifier: &str,
) -> Option<BoundNode<'g>> {
    ordered_pointer_edges(view, node)
        .into_iter()
        .map(|e| view.bind_edge(e))
        .find(|e| e.name() == Some(identifier))
        .map(|e| e.target())
}
