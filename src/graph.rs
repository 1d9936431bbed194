//! The owning arena (`GraphView`) and the non-owning navigation handles
//! (`BoundNode`/`BoundEdge`) built on top of it.
//!
//! Follows the teacher's own approach of wrapping a `petgraph` directed
//! graph directly and using its `NodeIndex`/`EdgeIndex` as the stable,
//! insertion-order-stable id type, rather than re-deriving an arena from
//! scratch.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::DiGraph;
use petgraph::Direction;

use crate::error::{GraphError, NextDirection, Result};
use crate::literal::DynamicAttributes;

/// Stable, insertion-order-assigned node handle. A type alias over
/// petgraph's own index rather than a hand-rolled newtype: the teacher's
/// `QueryGraph` does the same (`pub(crate) struct QueryGraphNode` stored in
/// a `DiGraph`, addressed by bare `NodeIndex`).
pub type NodeId = petgraph::graph::NodeIndex<u32>;
/// Stable, insertion-order-assigned edge handle.
pub type EdgeId = petgraph::graph::EdgeIndex<u32>;

/// Intrinsic tag distinguishing template nodes from ordinary ones. Closed
/// set, hence a plain enum rather than the open tagged-integer treatment
/// given to [`EdgeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum NodeKind {
    #[strum(to_string = "generic")]
    Generic,
    #[strum(to_string = "make_child")]
    MakeChild,
    #[strum(to_string = "make_link")]
    MakeLink,
    #[strum(to_string = "child_reference")]
    ChildReference,
}

/// The edge-kind discriminator: a tagged integer rather than a closed
/// enum, since kinds outside the known set are allowed but unnamed.
/// Known kinds are exposed as associated constants; edge-kind modules
/// (`crate::edge_kind::*`) match against these constants rather than an
/// exhaustive `match`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKind(pub u32);

impl EdgeKind {
    pub const COMPOSITION: EdgeKind = EdgeKind(0);
    pub const TYPE: EdgeKind = EdgeKind(1);
    pub const NEXT: EdgeKind = EdgeKind(2);
    pub const POINTER: EdgeKind = EdgeKind(3);
    pub const OPERAND: EdgeKind = EdgeKind(4);
    pub const INTERFACE_CONNECTION: EdgeKind = EdgeKind(5);
    pub const TRAIT: EdgeKind = EdgeKind(6);

    /// Per-kind default directionality: every known kind is directional
    /// except `InterfaceConnection`.
    pub fn default_directional(self) -> bool {
        self != EdgeKind::INTERFACE_CONNECTION
    }
}

impl fmt::Debug for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            EdgeKind::COMPOSITION => "Composition",
            EdgeKind::TYPE => "Type",
            EdgeKind::NEXT => "Next",
            EdgeKind::POINTER => "Pointer",
            EdgeKind::OPERAND => "Operand",
            EdgeKind::INTERFACE_CONNECTION => "InterfaceConnection",
            EdgeKind::TRAIT => "Trait",
            EdgeKind(other) => return write!(f, "Unknown({other})"),
        };
        f.write_str(name)
    }
}

/// A node in the property graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    attributes: DynamicAttributes,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attributes(&self) -> &DynamicAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut DynamicAttributes {
        &mut self.attributes
    }
}

/// An edge in the property graph. `name` and `order` are
/// write-once: nothing in this module exposes a setter for them after
/// construction.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    kind: EdgeKind,
    source: NodeId,
    target: NodeId,
    directional: bool,
    name: Option<String>,
    order: Option<u32>,
    attributes: DynamicAttributes,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn directional(&self) -> bool {
        self.directional
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn order(&self) -> Option<u32> {
        self.order
    }

    pub fn attributes(&self) -> &DynamicAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut DynamicAttributes {
        &mut self.attributes
    }

    /// The endpoint opposite to `node`, or `None` if `node` is not incident
    /// to this edge. Shared by every edge-kind module's `get_X_of`.
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

/// The sole owner of a typed property graph.
///
/// Node/edge storage is a `petgraph::graph::DiGraph`; a handful of side
/// tables cache the O(1) lookups the edge-kind modules need to enforce
/// their invariants without a full scan per insert. Nodes and edges are
/// never removed, so these tables never need eviction.
#[derive(Debug, Default)]
pub struct GraphView {
    graph: DiGraph<Node, Edge>,
    composition_child_index: HashMap<(NodeId, String), EdgeId>,
    composition_parent_index: HashMap<NodeId, EdgeId>,
    type_edge_index: HashMap<NodeId, EdgeId>,
    next_out_index: HashMap<NodeId, EdgeId>,
    next_in_index: HashMap<NodeId, EdgeId>,
}

impl GraphView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort pre-sizing. Real allocation failure is not reachable
    /// through ordinary insertion in safe Rust; this is the one place
    /// `GraphError::OutOfMemory` is actually exercised, by probing a
    /// throwaway fallible allocation of the requested size.
    pub fn reserve_nodes(&mut self, additional: usize) -> Result<()> {
        let mut probe: Vec<u8> = Vec::new();
        probe
            .try_reserve(additional)
            .map_err(|_| GraphError::OutOfMemory)?;
        self.graph.reserve_nodes(additional);
        Ok(())
    }

    pub fn reserve_edges(&mut self, additional: usize) -> Result<()> {
        let mut probe: Vec<u8> = Vec::new();
        probe
            .try_reserve(additional)
            .map_err(|_| GraphError::OutOfMemory)?;
        self.graph.reserve_edges(additional);
        Ok(())
    }

    pub fn insert_node(&mut self, kind: NodeKind, attributes: DynamicAttributes) -> NodeId {
        let id = self.graph.add_node(Node {
            id: NodeId::end(),
            kind,
            attributes,
        });
        self.graph[id].id = id;
        id
    }

    /// Raw edge insertion. Enforces the graph-wide invariants that must
    /// hold regardless of which edge-kind module the caller went through:
    /// duplicate composition identifiers, multiple composition parents, a
    /// second `Next` edge on either endpoint, and a second outgoing `Type`
    /// edge on a node.
    /// Kind-specific *convenience* is layered on top by `crate::edge_kind::*`
    /// (e.g. `composition::add_child`), but the invariant itself lives here
    /// so it holds even for direct callers.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
        directional: Option<bool>,
        name: Option<String>,
        order: Option<u32>,
        attributes: DynamicAttributes,
    ) -> Result<EdgeId> {
        let directional = directional.unwrap_or_else(|| kind.default_directional());

        if kind == EdgeKind::COMPOSITION {
            let identifier = name.clone().unwrap_or_default();
            if self
                .composition_child_index
                .contains_key(&(source, identifier.clone()))
            {
                return Err(GraphError::DuplicateChildIdentifier {
                    parent: source,
                    identifier,
                });
            }
            if self.composition_parent_index.contains_key(&target) {
                return Err(GraphError::MultipleCompositionParents { child: target });
            }
        }
        if kind == EdgeKind::TYPE && self.type_edge_index.contains_key(&source) {
            return Err(GraphError::TypeAlreadySet { node: source });
        }
        if kind == EdgeKind::NEXT {
            if self.next_out_index.contains_key(&source) {
                return Err(GraphError::NextAlreadySet {
                    node: source,
                    direction: NextDirection::Outgoing,
                });
            }
            if self.next_in_index.contains_key(&target) {
                return Err(GraphError::NextAlreadySet {
                    node: target,
                    direction: NextDirection::Incoming,
                });
            }
        }

        let id = self.graph.add_edge(
            source,
            target,
            Edge {
                id: EdgeId::end(),
                kind,
                source,
                target,
                directional,
                name: name.clone(),
                order,
                attributes,
            },
        );
        self.graph[id].id = id;

        match kind {
            EdgeKind::COMPOSITION => {
                let identifier = name.unwrap_or_default();
                self.composition_child_index
                    .insert((source, identifier), id);
                self.composition_parent_index.insert(target, id);
            }
            EdgeKind::TYPE => {
                self.type_edge_index.insert(source, id);
            }
            EdgeKind::NEXT => {
                self.next_out_index.insert(source, id);
                self.next_in_index.insert(target, id);
            }
            _ => {}
        }

        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.graph[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.graph[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.graph[id]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.graph[id]
    }

    /// The unique `Composition` edge whose target is `child`, via
    /// `composition_parent_index`. O(1); backs `composition::get_parent_edge`.
    pub(crate) fn composition_parent_edge(&self, child: NodeId) -> Option<EdgeId> {
        self.composition_parent_index.get(&child).copied()
    }

    /// The `Composition` edge under `parent` named `identifier`, via
    /// `composition_child_index`. O(1); backs `composition::get_child_by_identifier`.
    pub(crate) fn composition_child_edge(&self, parent: NodeId, identifier: &str) -> Option<EdgeId> {
        self.composition_child_index
            .get(&(parent, identifier.to_owned()))
            .copied()
    }

    /// The unique outgoing `Type` edge of `node`, via `type_edge_index`.
    /// O(1); backs `type_edge::get_type_edge`.
    pub(crate) fn type_edge_of(&self, node: NodeId) -> Option<EdgeId> {
        self.type_edge_index.get(&node).copied()
    }

    /// The unique outgoing `Next` edge of `node`, via `next_out_index`.
    /// O(1); backs `next::get_next_edge`.
    pub(crate) fn next_out_edge(&self, node: NodeId) -> Option<EdgeId> {
        self.next_out_index.get(&node).copied()
    }

    /// The unique incoming `Next` edge of `node`, via `next_in_index`.
    /// O(1); backs `next::get_previous_edge`.
    pub(crate) fn next_in_edge(&self, node: NodeId) -> Option<EdgeId> {
        self.next_in_index.get(&node).copied()
    }

    pub fn bind(&self, id: NodeId) -> BoundNode<'_> {
        BoundNode { view: self, id }
    }

    pub fn bind_edge(&self, id: EdgeId) -> BoundEdge<'_> {
        BoundEdge { view: self, id }
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }

    pub fn iter_out_edges(
        &self,
        node: NodeId,
        kind_filter: Option<EdgeKind>,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .filter(move |e| kind_filter.map_or(true, |k| e.weight().kind == k))
            .map(|e| e.id())
    }

    pub fn iter_in_edges(
        &self,
        node: NodeId,
        kind_filter: Option<EdgeKind>,
    ) -> impl Iterator<Item = EdgeId> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph
            .edges_directed(node, Direction::Incoming)
            .filter(move |e| kind_filter.map_or(true, |k| e.weight().kind == k))
            .map(|e| e.id())
    }

    /// Every edge incident to `node` regardless of direction. For
    /// non-directional edges (currently only `InterfaceConnection`) this is
    /// the only iteration that makes semantic sense; it is also what lets a
    /// directional edge's "other end" be found from either side.
    pub fn iter_neighbour_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.iter_out_edges(node, None)
            .chain(self.iter_in_edges(node, None))
    }

    /// Materialises a new view containing exactly the nodes/edges accepted
    /// by the predicates. Ids are re-issued in the new view; an edge
    /// survives only if both its endpoints also survived the node
    /// predicate.
    pub fn subgraph(
        &self,
        mut node_pred: impl FnMut(NodeId) -> bool,
        mut edge_pred: impl FnMut(EdgeId) -> bool,
    ) -> GraphView {
        let mut new_view = GraphView::new();
        let mut node_map: HashMap<NodeId, NodeId> = HashMap::new();

        for old_id in self.iter_nodes() {
            if node_pred(old_id) {
                let node = self.node(old_id);
                let new_id = new_view.insert_node(node.kind(), node.attributes().clone());
                node_map.insert(old_id, new_id);
            }
        }

        for old_id in self.iter_edges() {
            if !edge_pred(old_id) {
                continue;
            }
            let edge = self.edge(old_id);
            let (Some(&new_source), Some(&new_target)) =
                (node_map.get(&edge.source()), node_map.get(&edge.target()))
            else {
                continue;
            };
            new_view
                .insert_edge(
                    new_source,
                    new_target,
                    edge.kind(),
                    Some(edge.directional()),
                    edge.name().map(str::to_owned),
                    edge.order(),
                    edge.attributes().clone(),
                )
                .expect("a subgraph of an already-valid view cannot violate an invariant");
        }

        new_view
    }
}

/// A non-owning `(view, id)` pair, the sole navigation primitive.
/// Equality and hashing are by `(view pointer, id)`, not by id
/// alone, so references into two different views never compare equal.
#[derive(Clone, Copy)]
pub struct BoundNode<'g> {
    view: &'g GraphView,
    id: NodeId,
}

impl<'g> BoundNode<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn view(&self) -> &'g GraphView {
        self.view
    }

    pub fn node(&self) -> &'g Node {
        self.view.node(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn attributes(&self) -> &'g DynamicAttributes {
        self.node().attributes()
    }
}

impl PartialEq for BoundNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.view, other.view) && self.id == other.id
    }
}

impl Eq for BoundNode<'_> {}

impl std::hash::Hash for BoundNode<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.view as *const GraphView as usize).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for BoundNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundNode")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

#[derive(Clone, Copy)]
pub struct BoundEdge<'g> {
    view: &'g GraphView,
    id: EdgeId,
}

impl<'g> BoundEdge<'g> {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn view(&self) -> &'g GraphView {
        self.view
    }

    pub fn edge(&self) -> &'g Edge {
        self.view.edge(self.id)
    }

    pub fn kind(&self) -> EdgeKind {
        self.edge().kind()
    }

    pub fn source(&self) -> BoundNode<'g> {
        self.view.bind(self.edge().source())
    }

    pub fn target(&self) -> BoundNode<'g> {
        self.view.bind(self.edge().target())
    }

    pub fn name(&self) -> Option<&'g str> {
        self.edge().name()
    }

    pub fn order(&self) -> Option<u32> {
        self.edge().order()
    }

    pub fn directional(&self) -> bool {
        self.edge().directional()
    }

    pub fn attributes(&self) -> &'g DynamicAttributes {
        self.edge().attributes()
    }

    /// The endpoint opposite to `node`, bound into this view.
    pub fn other_end_of(&self, node: NodeId) -> Option<BoundNode<'g>> {
        self.edge().other_end(node).map(|id| self.view.bind(id))
    }
}

impl PartialEq for BoundEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.view, other.view) && self.id == other.id
    }
}

impl Eq for BoundEdge<'_> {}

impl std::hash::Hash for BoundEdge<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.view as *const GraphView as usize).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for BoundEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundEdge")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
