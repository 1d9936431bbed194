//! Deferred construction records.
//!
//! `EdgeCreationAttributes` and `NodeCreationAttributes` describe what to
//! build without yet owning a view to build it in — exactly the shape
//! needed by template nodes (`MakeLink` holds one of the former,
//! `MakeChild` optionally holds one of the latter) so the instantiation
//! engine can materialise them once the instance subgraph exists.

use crate::error::Result;
use crate::graph::{Edge, EdgeId, EdgeKind, GraphView, Node, NodeId, NodeKind};
use crate::literal::DynamicAttributes;

/// Records everything needed to materialise an edge except its endpoints.
#[derive(Debug, Clone)]
pub struct EdgeCreationAttributes {
    kind: EdgeKind,
    directional: Option<bool>,
    name: Option<String>,
    order: Option<u32>,
    dynamic_attributes: DynamicAttributes,
}

impl EdgeCreationAttributes {
    pub fn new(kind: EdgeKind) -> Self {
        Self {
            kind,
            directional: None,
            name: None,
            order: None,
            dynamic_attributes: DynamicAttributes::new(),
        }
    }

    pub fn with_directional(mut self, directional: bool) -> Self {
        self.directional = Some(directional);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_attributes(mut self, attributes: DynamicAttributes) -> Self {
        self.dynamic_attributes = attributes;
        self
    }

    pub fn get_tid(&self) -> EdgeKind {
        self.kind
    }

    /// Constructs but does not insert an edge. Used when building template
    /// subgraphs where the actual insertion happens later, at instantiation
    /// time, once real endpoints exist.
    pub fn create_edge(&self, source: NodeId, target: NodeId) -> Edge {
        // `Edge`'s fields are private to `crate::graph`; go through a
        // throwaway view so every `Edge` in the system is still produced by
        // the one code path that assigns it a real id.
        let mut scratch = GraphView::new();
        let id = scratch
            .insert_edge(
                source,
                target,
                self.kind,
                self.directional,
                self.name.clone(),
                self.order,
                self.dynamic_attributes.clone(),
            )
            .expect("a freshly built scratch view cannot violate an invariant");
        scratch.edge(id).clone()
    }

    /// Constructs and inserts the edge into `view`.
    pub fn insert_edge(&self, view: &mut GraphView, source: NodeId, target: NodeId) -> Result<EdgeId> {
        view.insert_edge(
            source,
            target,
            self.kind,
            self.directional,
            self.name.clone(),
            self.order,
            self.dynamic_attributes.clone(),
        )
    }

    /// Copies dynamic attributes onto an edge that has already been
    /// inserted. The edge's kind never changes; `name` and `order` are
    /// write-once on construction per the `Edge` invariant (spec.md §3) and
    /// are deliberately not touched here, even though this builder may
    /// carry values for them — see DESIGN.md's "Open questions resolved".
    pub fn apply_to(&self, view: &mut GraphView, edge: EdgeId) {
        let target = view.edge_mut(edge);
        self.dynamic_attributes.clone_into(target.attributes_mut());
    }
}

/// The analogous deferred-construction record for nodes. Currently only
/// carries dynamic attributes.
#[derive(Debug, Clone, Default)]
pub struct NodeCreationAttributes {
    dynamic: Option<DynamicAttributes>,
}

impl NodeCreationAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dynamic(mut self, attributes: DynamicAttributes) -> Self {
        self.dynamic = Some(attributes);
        self
    }

    pub fn dynamic(&self) -> Option<&DynamicAttributes> {
        self.dynamic.as_ref()
    }

    pub fn create_node(&self, kind: NodeKind) -> Node {
        let mut scratch = GraphView::new();
        let id = scratch.insert_node(kind, self.dynamic.clone().unwrap_or_default());
        scratch.node(id).clone()
    }

    pub fn insert_node(&self, view: &mut GraphView, kind: NodeKind) -> NodeId {
        view.insert_node(kind, self.dynamic.clone().unwrap_or_default())
    }

    /// Copies dynamic attributes onto an already-inserted node.
    pub fn apply_to(&self, view: &mut GraphView, node: NodeId) {
        if let Some(dynamic) = &self.dynamic {
            dynamic.clone_into(view.node_mut(node).attributes_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_edge_matches_builder_fields() {
        let mut view = GraphView::new();
        let a = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let b = view.insert_node(NodeKind::Generic, DynamicAttributes::new());

        let mut attrs = DynamicAttributes::new();
        attrs.put("k", "v");
        let builder = EdgeCreationAttributes::new(EdgeKind::POINTER)
            .with_name("p")
            .with_order(3)
            .with_attributes(attrs);

        let edge_id = builder.insert_edge(&mut view, a, b).unwrap();
        let edge = view.edge(edge_id);
        assert_eq!(edge.kind(), EdgeKind::POINTER);
        assert_eq!(edge.name(), Some("p"));
        assert_eq!(edge.order(), Some(3));
        assert_eq!(edge.attributes().get("k").and_then(|l| l.as_str()), Some("v"));
    }

    #[test]
    fn apply_to_merges_attributes_without_changing_kind() {
        let mut view = GraphView::new();
        let a = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let b = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let edge_id = view
            .insert_edge(a, b, EdgeKind::OPERAND, None, None, None, DynamicAttributes::new())
            .unwrap();

        let mut attrs = DynamicAttributes::new();
        attrs.put("extra", crate::literal::Literal::Int(1));
        let builder = EdgeCreationAttributes::new(EdgeKind::OPERAND).with_attributes(attrs);
        builder.apply_to(&mut view, edge_id);

        assert_eq!(view.edge(edge_id).kind(), EdgeKind::OPERAND);
        assert!(view.edge(edge_id).attributes().get("extra").is_some());
    }
}
