//! `Next` edges, a doubly-linked chain (previous → next).

use crate::builder::EdgeCreationAttributes;
use crate::error::Result;
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};

pub const TID: EdgeKind = EdgeKind::NEXT;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build() -> EdgeCreationAttributes {
    EdgeCreationAttributes::new(TID)
}

/// Links `previous` to `next`. Fails with `NextAlreadySet` if either node
/// already has an edge in the relevant direction — enforced atomically by
/// `GraphView::insert_edge`.
pub fn link(view: &mut GraphView, previous: NodeId, next: NodeId) -> Result<EdgeId> {
    build().insert_edge(view, previous, next)
}

pub fn get_previous_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.source())
}

pub fn get_next_node(edge: BoundEdge<'_>) -> Result<BoundNode<'_>> {
    crate::edge_kind::require_kind(edge, TID)?;
    Ok(edge.target())
}

pub fn get_next_of(edge: BoundEdge<'_>, node: NodeId) -> Option<BoundNode<'_>> {
    if !is_instance(edge) {
        return None;
    }
    edge.other_end_of(node)
}

/// O(1) via the graph's `next_out_index` side table rather than a scan of
/// outgoing edges.
pub fn get_next_edge<'g>(view: &'g GraphView, node: NodeId) -> Option<BoundEdge<'g>> {
    view.next_out_edge(node).map(|e| view.bind_edge(e))
}

/// O(1) via the graph's `next_in_index` side table rather than a scan of
/// incoming edges.
pub fn get_previous_edge<'g>(view: &'g GraphView, node: NodeId) -> Option<BoundEdge<'g>> {
    view.next_in_edge(node).map(|e| view.bind_edge(e))
}

pub fn get_next(view: &GraphView, node: NodeId) -> Option<NodeId> {
    get_next_edge(view, node).map(|e| e.edge().target())
}

pub fn get_previous(view: &GraphView, node: NodeId) -> Option<NodeId> {
    get_previous_edge(view, node).map(|e| e.edge().source())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;
    use crate::literal::DynamicAttributes;

    fn node(view: &mut GraphView) -> NodeId {
        view.insert_node(NodeKind::Generic, DynamicAttributes::new())
    }

    #[test]
    fn second_outgoing_next_is_rejected() {
        let mut view = GraphView::new();
        let a = node(&mut view);
        let b = node(&mut view);
        let c = node(&mut view);
        link(&mut view, a, b).unwrap();
        let err = link(&mut view, a, c).unwrap_err();
        assert!(matches!(err, crate::error::GraphError::NextAlreadySet { .. }));
    }

    #[test]
    fn second_incoming_next_is_rejected() {
        let mut view = GraphView::new();
        let a = node(&mut view);
        let b = node(&mut view);
        let c = node(&mut view);
        link(&mut view, a, c).unwrap();
        let err = link(&mut view, b, c).unwrap_err();
        assert!(matches!(err, crate::error::GraphError::NextAlreadySet { .. }));
    }

    #[test]
    fn chain_walks_forward_and_backward() {
        let mut view = GraphView::new();
        let a = node(&mut view);
        let b = node(&mut view);
        let c = node(&mut view);
        link(&mut view, a, b).unwrap();
        link(&mut view, b, c).unwrap();

        assert_eq!(get_next(&view, a), Some(b));
        assert_eq!(get_next(&view, b), Some(c));
        assert_eq!(get_next(&view, c), None);
        assert_eq!(get_previous(&view, c), Some(b));
        assert_eq!(get_previous(&view, a), None);
    }
}
