//! `Type` edges (instance → type).
//!
//! `is_node_instance_of(instance, type)` holds when the type edge exists
//! and its target is the given type node, so the edge runs *from* the
//! instance *to* its type (instance is the source, type is the target);
//! see DESIGN.md.

use crate::builder::EdgeCreationAttributes;
use crate::error::{GraphError, Result};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};

pub const TID: EdgeKind = EdgeKind::TYPE;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build() -> EdgeCreationAttributes {
    EdgeCreationAttributes::new(TID)
}

/// A node has at most one outgoing `Type` edge. `GraphView::insert_edge`
/// rejects a second one with `TypeAlreadySet`, so the invariant is enforced
/// structurally at the storage level rather than relying on `set_type`
/// being the only caller that ever constructs one.
pub fn set_type(view: &mut GraphView, instance: NodeId, type_node: NodeId) -> Result<EdgeId> {
    build().insert_edge(view, instance, type_node)
}

/// The unique outgoing `Type` edge of `instance`, if any. O(1) via the
/// graph's `type_edge_index` side table rather than a scan of outgoing
/// edges.
pub fn get_type_edge(view: &GraphView, instance: NodeId) -> Option<EdgeId> {
    view.type_edge_of(instance)
}

/// The type node `instance` is declared an instance of.
pub fn get_type_node(view: &GraphView, instance: NodeId) -> Option<NodeId> {
    get_type_edge(view, instance).map(|e| view.edge(e).target())
}

pub fn get_instance_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.source())
}

pub fn get_type_node_of_edge(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.target())
}

pub fn get_type_of(edge: BoundEdge<'_>, node: NodeId) -> Option<BoundNode<'_>> {
    if !is_instance(edge) {
        return None;
    }
    edge.other_end_of(node)
}

pub fn is_node_instance_of(view: &GraphView, instance: NodeId, type_node: NodeId) -> bool {
    get_type_node(view, instance) == Some(type_node)
}
