//! `InterfaceConnection` edges (peer ↔ peer, non-directional) and the
//! BFS connectivity solver over them.
//!
//! Shallow and deep connections share one traversal: both are walked
//! uniformly rather than given distinct reachability semantics (see
//! DESIGN.md).

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::builder::EdgeCreationAttributes;
use crate::error::{GraphError, Result};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};
use crate::literal::DynamicAttributes;

pub const TID: EdgeKind = EdgeKind::INTERFACE_CONNECTION;

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

fn build(shallow: bool) -> EdgeCreationAttributes {
    let mut attributes = DynamicAttributes::new();
    attributes.put("shallow", shallow);
    EdgeCreationAttributes::new(TID)
        .with_directional(false)
        .with_attributes(attributes)
}

/// Deep connection between two peers.
pub fn connect(view: &mut GraphView, a: NodeId, b: NodeId) -> Result<EdgeId> {
    build(false).insert_edge(view, a, b)
}

/// Shallow connection between two peers. Same kind tag as [`connect`];
/// distinguished only by the `shallow` dynamic attribute.
pub fn connect_shallow(view: &mut GraphView, a: NodeId, b: NodeId) -> Result<EdgeId> {
    build(true).insert_edge(view, a, b)
}

pub fn is_shallow(edge: BoundEdge<'_>) -> bool {
    edge.attributes()
        .get("shallow")
        .and_then(|literal| literal.as_bool())
        .unwrap_or(false)
}

pub fn get_connected_of(edge: BoundEdge<'_>, node: NodeId) -> Option<BoundNode<'_>> {
    if !is_instance(edge) {
        return None;
    }
    edge.other_end_of(node)
}

/// Neighbour edges of `node` via `InterfaceConnection`, in the order they
/// were inserted into the view. Used as the BFS tie-break: whichever
/// predecessor edge was inserted first wins.
fn neighbour_edges_in_insertion_order(view: &GraphView, node: NodeId) -> Vec<EdgeId> {
    let mut edges: Vec<EdgeId> = view
        .iter_neighbour_edges(node)
        .filter(|&e| view.edge(e).kind() == TID)
        .collect();
    edges.sort_by_key(|e| e.index());
    edges
}

/// Enumerates every node reachable from `source`, with the BFS predecessor
/// path to each. Excludes `source` itself unless `include_self` is set.
/// Both shallow and deep edges are traversable.
#[tracing::instrument(skip(view))]
pub fn get_connected(
    view: &GraphView,
    source: NodeId,
    include_self: bool,
) -> Result<IndexMap<NodeId, Vec<EdgeId>>> {
    let node_count = view.iter_nodes().count();
    let mut probe: Vec<u8> = Vec::new();
    probe
        .try_reserve(node_count)
        .map_err(|_| GraphError::OutOfMemory)?;

    let mut visited: IndexMap<NodeId, Vec<EdgeId>> = IndexMap::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    visited.insert(source, Vec::new());
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let current_path = visited[&current].clone();
        for edge_id in neighbour_edges_in_insertion_order(view, current) {
            let other = view
                .edge(edge_id)
                .other_end(current)
                .expect("edge returned by neighbour iteration is incident to `current`");
            if visited.contains_key(&other) {
                continue;
            }
            let mut path = current_path.clone();
            path.push(edge_id);
            visited.insert(other, path);
            queue.push_back(other);
        }
    }

    if !include_self {
        visited.shift_remove(&source);
    }

    tracing::debug!(reachable = visited.len(), "interface connectivity solved");
    Ok(visited)
}

/// Shortest path from `source` to `target` over `InterfaceConnection`
/// edges, or `None` if unreachable.
pub fn is_connected_to(
    view: &GraphView,
    source: NodeId,
    target: NodeId,
) -> Result<Option<Vec<EdgeId>>> {
    if source == target {
        return Ok(Some(Vec::new()));
    }
    Ok(get_connected(view, source, false)?.swap_remove(&target))
}
