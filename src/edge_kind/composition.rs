//! `Composition` edges (parent → child).

use crate::builder::EdgeCreationAttributes;
use crate::edge_kind::type_edge;
use crate::error::{GraphError, Result, VisitResult};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};
use crate::literal::DynamicAttributes;

pub const TID: EdgeKind = EdgeKind::COMPOSITION;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build(child_identifier: impl Into<String>) -> EdgeCreationAttributes {
    EdgeCreationAttributes::new(TID).with_name(child_identifier)
}

/// Inserts a `Composition` edge from `parent` to `child` named `identifier`.
/// Fails with `DuplicateChildIdentifier` if `parent` already has a child by
/// that name, or `MultipleCompositionParents` if `child` already has a
/// composition parent. Both checks are atomic with the insertion: a
/// rejected call leaves the graph unchanged rather than inserting then
/// rolling back — see DESIGN.md.
pub fn add_child(
    view: &mut GraphView,
    parent: NodeId,
    child: NodeId,
    identifier: impl Into<String>,
) -> Result<EdgeId> {
    build(identifier).insert_edge(view, parent, child)
}

pub fn add_child_with_attributes(
    view: &mut GraphView,
    parent: NodeId,
    child: NodeId,
    identifier: impl Into<String>,
    attributes: DynamicAttributes,
) -> Result<EdgeId> {
    build(identifier)
        .with_attributes(attributes)
        .insert_edge(view, parent, child)
}

pub fn get_parent_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.source())
}

pub fn get_child_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.target())
}

pub fn get_composition_of(edge: BoundEdge<'_>, node: NodeId) -> Option<BoundNode<'_>> {
    if !is_instance(edge) {
        return None;
    }
    edge.other_end_of(node)
}

/// The unique incoming `Composition` edge of `node`, if any. O(1) via the
/// graph's side table rather than a scan of incoming edges.
pub fn get_parent_edge<'g>(view: &'g GraphView, node: NodeId) -> Option<BoundEdge<'g>> {
    view.composition_parent_edge(node).map(|e| view.bind_edge(e))
}

/// O(1) via the graph's `composition_child_index` side table rather than a
/// scan of outgoing edges.
pub fn get_child_by_identifier<'g>(
    view: &'g GraphView,
    parent: NodeId,
    identifier: &str,
) -> Option<BoundNode<'g>> {
    let edge_id = view.composition_child_edge(parent, identifier)?;
    Some(view.bind(view.edge(edge_id).target()))
}

pub fn visit_children(
    node: BoundNode<'_>,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    for edge_id in node.view().iter_out_edges(node.id(), Some(TID)) {
        match f(node.view().bind_edge(edge_id)) {
            VisitResult::Continue => continue,
            other => return other,
        }
    }
    VisitResult::Continue
}

/// Children of `parent` whose `Type` edge points at `child_type`.
pub fn visit_children_of_type(
    node: BoundNode<'_>,
    child_type: NodeId,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    let view = node.view();
    visit_children(node, |edge| {
        let child = edge.target().id();
        if type_edge::is_node_instance_of(view, child, child_type) {
            f(edge)
        } else {
            VisitResult::Continue
        }
    })
}

/// The unique child of `parent` whose type is `child_type`, or `None` if
/// there is no such child. `AmbiguousChild` if there is more than one.
pub fn try_get_single_child_of_type(
    view: &GraphView,
    parent: NodeId,
    child_type: NodeId,
) -> Result<Option<NodeId>> {
    let mut found = None;
    for edge_id in view.iter_out_edges(parent, Some(TID)) {
        let child = view.edge(edge_id).target();
        if type_edge::is_node_instance_of(view, child, child_type) {
            if found.is_some() {
                return Err(GraphError::AmbiguousChild { parent });
            }
            found = Some(child);
        }
    }
    Ok(found)
}
