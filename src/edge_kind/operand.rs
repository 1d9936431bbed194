//! `Operand` edges (expression → operand). Mirrors
//! `composition`'s shape but across the expression/operand direction, and
//! many-to-many: one operand may serve several expressions, one expression
//! may hold several operands.

use crate::builder::EdgeCreationAttributes;
use crate::edge_kind::type_edge;
use crate::error::{Result, VisitResult};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};

pub const TID: EdgeKind = EdgeKind::OPERAND;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build(operand_identifier: Option<String>) -> EdgeCreationAttributes {
    let builder = EdgeCreationAttributes::new(TID);
    match operand_identifier {
        Some(name) => builder.with_name(name),
        None => builder,
    }
}

pub fn add_operand(
    view: &mut GraphView,
    expression: NodeId,
    operand: NodeId,
    identifier: Option<String>,
) -> Result<EdgeId> {
    build(identifier).insert_edge(view, expression, operand)
}

pub fn get_expression_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.source())
}

pub fn get_operand_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.target())
}

pub fn get_operand_of(edge: BoundEdge<'_>, node: NodeId) -> Option<BoundNode<'_>> {
    if !is_instance(edge) {
        return None;
    }
    edge.other_end_of(node)
}

pub fn visit_operand_edges(
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

pub fn visit_operands_of_type(
    node: BoundNode<'_>,
    operand_type: NodeId,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    let view = node.view();
    visit_operand_edges(node, |edge| {
        if type_edge::is_node_instance_of(view, edge.target().id(), operand_type) {
            f(edge)
        } else {
            VisitResult::Continue
        }
    })
}

/// Expressions that use `node` as an operand.
pub fn visit_expression_edges(
    node: BoundNode<'_>,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    for edge_id in node.view().iter_in_edges(node.id(), Some(TID)) {
        match f(node.view().bind_edge(edge_id)) {
            VisitResult::Continue => continue,
            other => return other,
        }
    }
    VisitResult::Continue
}

pub fn visit_expression_edges_of_type(
    node: BoundNode<'_>,
    expression_type: NodeId,
    mut f: impl FnMut(BoundEdge<'_>) -> VisitResult,
) -> VisitResult {
    let view = node.view();
    visit_expression_edges(node, |edge| {
        if type_edge::is_node_instance_of(view, edge.source().id(), expression_type) {
            f(edge)
        } else {
            VisitResult::Continue
        }
    })
}

pub fn get_operand_by_identifier<'g>(
    view: &'g GraphView,
    expression: NodeId,
    identifier: &str,
) -> Option<BoundNode<'g>> {
    view.iter_out_edges(expression, Some(TID))
        .map(|e| view.edge(e))
        .find(|e| e.name() == Some(identifier))
        .map(|e| view.bind(e.target()))
}
