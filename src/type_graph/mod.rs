//! The `TypeGraph` view and the instantiation engine.
//!
//! `TypeGraph` borrows its underlying `GraphView` rather than owning it —
//! every method here takes the view as a parameter instead of the struct
//! holding a `&GraphView`/`&mut GraphView` field, which would otherwise pin
//! the struct's lifetime to one borrow and make it unusable across the
//! sequence of mutations instantiation requires. `TypeGraph` itself only
//! holds the bookkeeping that doesn't belong in the graph proper: the
//! name → type-node registry and a distinguished self node.
//!
//! There is deliberately no `TypeGraph::of(node)` that finds "the" type
//! graph owning an arbitrary node: that would need a process-global
//! registry of every `TypeGraph` ever constructed, which this crate does
//! not keep. [`TypeGraph::owns_node`] answers the question a caller who
//! already holds the right `TypeGraph` actually has.

pub mod template;

use indexmap::IndexMap;

use crate::edge_kind::{composition, operand, trait_edge, type_edge};
use crate::error::{GraphError, Result};
use crate::graph::{EdgeKind, GraphView, NodeId, NodeKind};
use crate::literal::DynamicAttributes;

/// Edge kinds a node's subgraph extends through via `get_subgraph_of_node`;
/// `InterfaceConnection` is deliberately excluded.
const SUBGRAPH_EDGE_KINDS: [EdgeKind; 4] = [
    EdgeKind::COMPOSITION,
    EdgeKind::TYPE,
    EdgeKind::TRAIT,
    EdgeKind::POINTER,
];

pub struct TypeGraph {
    self_node: NodeId,
    types_by_name: IndexMap<String, NodeId>,
}

impl TypeGraph {
    /// Inserts the distinguished self node into `view` and returns a fresh,
    /// empty registry over it.
    pub fn new(view: &mut GraphView) -> Self {
        let self_node = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        Self {
            self_node,
            types_by_name: IndexMap::new(),
        }
    }

    pub fn get_self_node(&self) -> NodeId {
        self.self_node
    }

    /// Inserts a fresh type node, registered under `identifier` and
    /// composed under the self node so it has a stable parent.
    pub fn add_type(&mut self, view: &mut GraphView, identifier: impl Into<String>) -> Result<NodeId> {
        let identifier = identifier.into();
        if self.types_by_name.contains_key(&identifier) {
            return Err(GraphError::DuplicateTypeName { identifier });
        }
        let type_node = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        composition::add_child(view, self.self_node, type_node, identifier.clone())?;
        self.types_by_name.insert(identifier, type_node);
        Ok(type_node)
    }

    /// Convenience combining [`Self::add_type`] with
    /// `trait_edge::mark_as_trait`.
    pub fn add_trait(&mut self, view: &mut GraphView, identifier: impl Into<String>) -> Result<NodeId> {
        let type_node = self.add_type(view, identifier)?;
        trait_edge::mark_as_trait(view, type_node);
        Ok(type_node)
    }

    pub fn get_type_by_name(&self, identifier: &str) -> Option<NodeId> {
        self.types_by_name.get(identifier).copied()
    }

    pub fn get_or_create_type(&mut self, view: &mut GraphView, identifier: impl Into<String>) -> NodeId {
        let identifier = identifier.into();
        if let Some(&existing) = self.types_by_name.get(&identifier) {
            return existing;
        }
        self.add_type(view, identifier)
            .expect("identifier was just confirmed absent from the registry")
    }

    /// Whether `node` is a type registered on this `TypeGraph`, or an
    /// instance of one. Answers what `of`/`of_type`/`of_instance` would
    /// answer, scoped to a `TypeGraph` the caller already holds.
    pub fn owns_node(&self, view: &GraphView, node: NodeId) -> bool {
        if self.types_by_name.values().any(|&t| t == node) {
            return true;
        }
        type_edge::get_type_node(view, node)
            .is_some_and(|type_node| self.types_by_name.values().any(|&t| t == type_node))
    }

    /// Subgraph containing only registered type nodes and the edges among
    /// them.
    pub fn get_type_subgraph(&self, view: &GraphView) -> GraphView {
        let is_type_node = |n: NodeId| self.types_by_name.values().any(|&t| t == n);
        view.subgraph(is_type_node, |edge_id| {
            let edge = view.edge(edge_id);
            is_type_node(edge.source()) && is_type_node(edge.target())
        })
    }

    /// For each registered type name, the number of instances (nodes whose
    /// `Type` edge points at it).
    pub fn get_type_instance_overview(&self, view: &GraphView) -> IndexMap<String, usize> {
        self.types_by_name
            .iter()
            .map(|(name, &type_node)| {
                let count = view.iter_in_edges(type_node, Some(type_edge::TID)).count();
                (name.clone(), count)
            })
            .collect()
    }

    /// The transitive closure of `start` under `Composition`, `Type`,
    /// `Trait`, and `Pointer` edges — not `InterfaceConnection`. A freshly
    /// allocated view owned by the caller.
    pub fn get_subgraph_of_node(view: &GraphView, start: NodeId) -> GraphView {
        use std::collections::{HashSet, VecDeque};

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for edge_id in view.iter_out_edges(current, None) {
                let edge = view.edge(edge_id);
                if !SUBGRAPH_EDGE_KINDS.contains(&edge.kind()) {
                    continue;
                }
                if visited.insert(edge.target()) {
                    queue.push_back(edge.target());
                }
            }
        }

        view.subgraph(
            |n| visited.contains(&n),
            |edge_id| {
                let edge = view.edge(edge_id);
                SUBGRAPH_EDGE_KINDS.contains(&edge.kind())
                    && visited.contains(&edge.source())
                    && visited.contains(&edge.target())
            },
        )
    }

    /// Looks up `identifier` and instantiates it. `UnknownTypeName` if no
    /// type is registered under that name.
    pub fn instantiate(
        &self,
        view: &mut GraphView,
        identifier: &str,
        extra: Option<DynamicAttributes>,
    ) -> Result<NodeId> {
        let type_node = self
            .get_type_by_name(identifier)
            .ok_or_else(|| GraphError::UnknownTypeName {
                identifier: identifier.to_string(),
            })?;
        self.instantiate_node(view, type_node, extra)
    }

    /// Materialises `type_node` into a fresh instance subgraph (spec.md
    /// §4.H): a node `I` typed to `type_node`, its composition children
    /// recursively instantiated, its `MakeLink` operand templates resolved
    /// into real edges, and its trait children attached.
    pub fn instantiate_node(
        &self,
        view: &mut GraphView,
        type_node: NodeId,
        extra: Option<DynamicAttributes>,
    ) -> Result<NodeId> {
        let mut stack = Vec::new();
        self.instantiate_node_with_stack(view, type_node, extra.unwrap_or_default(), &mut stack)
    }

    fn instantiate_node_with_stack(
        &self,
        view: &mut GraphView,
        type_node: NodeId,
        extra: DynamicAttributes,
        stack: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        if stack.contains(&type_node) {
            return Err(GraphError::TypeCycle { type_node });
        }
        stack.push(type_node);
        let result = self.instantiate_node_once(view, type_node, extra, stack);
        stack.pop();
        result
    }

    fn instantiate_node_once(
        &self,
        view: &mut GraphView,
        type_node: NodeId,
        extra: DynamicAttributes,
        stack: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        let mut attrs = view.node(type_node).attributes().clone();
        extra.clone_into(&mut attrs);
        let instance = view.insert_node(NodeKind::Generic, attrs);
        type_edge::set_type(view, instance, type_node)?;

        let mut composition_edges: Vec<_> = view.iter_out_edges(type_node, Some(composition::TID)).collect();
        composition_edges.sort_by_key(|e| e.index());
        for edge_id in composition_edges {
            let edge = view.edge(edge_id).clone();
            let child = edge.target();
            let edge_name = edge.name().map(str::to_owned);

            let (child_type, name, overlay) = if view.node(child).kind() == NodeKind::MakeChild {
                let child_type = template::make_child_type(view, child);
                let name = edge_name.or_else(|| template::make_child_identifier(view, child));
                let nca = template::node_creation_attributes_of(view, child);
                let overlay = nca.dynamic().cloned().unwrap_or_default();
                (child_type, name, overlay)
            } else {
                (child, edge_name, DynamicAttributes::new())
            };

            let child_instance = self.instantiate_node_with_stack(view, child_type, overlay, stack)?;
            composition::add_child(view, instance, child_instance, name.unwrap_or_default())?;
        }

        let mut operand_edges: Vec<_> = view.iter_out_edges(type_node, Some(operand::TID)).collect();
        operand_edges.sort_by_key(|e| e.index());
        for edge_id in operand_edges {
            let make_link_node = view.edge(edge_id).target();
            if view.node(make_link_node).kind() != NodeKind::MakeLink {
                continue;
            }

            let lhs_ref = template::make_link_lhs(view, make_link_node);
            let rhs_ref = template::make_link_rhs(view, make_link_node);

            let lhs = template::resolve(view, lhs_ref, instance).ok_or_else(|| GraphError::LinkResolutionFailed {
                base: instance,
                path: template::reference_path(view, lhs_ref),
            })?;
            let rhs = template::resolve(view, rhs_ref, instance).ok_or_else(|| GraphError::LinkResolutionFailed {
                base: instance,
                path: template::reference_path(view, rhs_ref),
            })?;

            let edge_attrs = template::edge_creation_attributes_of(view, make_link_node);
            edge_attrs.insert_edge(view, lhs, rhs)?;
        }

        let mut trait_edges: Vec<_> = view.iter_out_edges(type_node, Some(trait_edge::TID)).collect();
        trait_edges.sort_by_key(|e| e.index());
        for edge_id in trait_edges {
            let trait_type = view.edge(edge_id).target();
            let trait_instance =
                self.instantiate_node_with_stack(view, trait_type, DynamicAttributes::new(), stack)?;
            trait_edge::add_trait_instance_to(view, instance, trait_instance)?;
        }

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EdgeCreationAttributes;
    use crate::edge_kind::interface;

    #[test]
    fn resistor_instantiates_two_pad_children() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);

        let pad = types.add_type(&mut view, "Pad").unwrap();
        let resistor = types.add_type(&mut view, "Resistor").unwrap();
        let pin1 = template::make_child(&mut view, pad, None, DynamicAttributes::new());
        let pin2 = template::make_child(&mut view, pad, None, DynamicAttributes::new());
        composition::add_child(&mut view, resistor, pin1, "Pin1").unwrap();
        composition::add_child(&mut view, resistor, pin2, "Pin2").unwrap();

        let instance = types.instantiate(&mut view, "Resistor", None).unwrap();

        assert!(type_edge::is_node_instance_of(&view, instance, resistor));
        let p1 = composition::get_child_by_identifier(&view, instance, "Pin1").unwrap();
        let p2 = composition::get_child_by_identifier(&view, instance, "Pin2").unwrap();
        assert!(type_edge::is_node_instance_of(&view, p1.id(), pad));
        assert!(type_edge::is_node_instance_of(&view, p2.id(), pad));
        assert_eq!(view.iter_out_edges(instance, Some(composition::TID)).count(), 2);
    }

    #[test]
    fn divider_make_link_connects_resolved_pins() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);

        let pad = types.add_type(&mut view, "Pad").unwrap();
        let resistor = types.add_type(&mut view, "Resistor").unwrap();
        let r_pin1 = template::make_child(&mut view, pad, None, DynamicAttributes::new());
        let r_pin2 = template::make_child(&mut view, pad, None, DynamicAttributes::new());
        composition::add_child(&mut view, resistor, r_pin1, "Pin1").unwrap();
        composition::add_child(&mut view, resistor, r_pin2, "Pin2").unwrap();

        let divider = types.add_type(&mut view, "Divider").unwrap();
        let r1 = template::make_child(&mut view, resistor, None, DynamicAttributes::new());
        let r2 = template::make_child(&mut view, resistor, None, DynamicAttributes::new());
        composition::add_child(&mut view, divider, r1, "R1").unwrap();
        composition::add_child(&mut view, divider, r2, "R2").unwrap();

        let lhs_ref = template::add_reference(&mut view, &["R1", "Pin2"]);
        let rhs_ref = template::add_reference(&mut view, &["R2", "Pin1"]);
        let link = template::make_link(
            &mut view,
            lhs_ref,
            rhs_ref,
            EdgeCreationAttributes::new(EdgeKind::INTERFACE_CONNECTION),
        );
        operand::add_operand(&mut view, divider, link, None).unwrap();

        let instance = types.instantiate(&mut view, "Divider", None).unwrap();

        let r1_instance = composition::get_child_by_identifier(&view, instance, "R1").unwrap();
        let r2_instance = composition::get_child_by_identifier(&view, instance, "R2").unwrap();
        let r1_pin2 = composition::get_child_by_identifier(&view, r1_instance.id(), "Pin2").unwrap();
        let r2_pin1 = composition::get_child_by_identifier(&view, r2_instance.id(), "Pin1").unwrap();

        let path = interface::is_connected_to(&view, r1_pin2.id(), r2_pin1.id())
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn has_value_trait_marks_instantiates_and_finds_implementer() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);

        let has_value = types.add_trait(&mut view, "HasValue").unwrap();
        let n = types.add_type(&mut view, "N").unwrap();
        let n_instance = types.instantiate(&mut view, "N", None).unwrap();

        let trait_instance = trait_edge::add_trait_to(&types, &mut view, n_instance, has_value).unwrap();
        assert!(type_edge::is_node_instance_of(&view, trait_instance, has_value));

        assert_eq!(
            trait_edge::try_get_trait(&view, n_instance, has_value).unwrap(),
            Some(trait_instance)
        );

        let mut implementers = Vec::new();
        trait_edge::visit_implementers(&view, has_value, |node| {
            implementers.push(node.id());
            crate::error::VisitResult::Continue
        });
        assert_eq!(implementers, vec![n_instance]);
        let _ = n; // type node kept for clarity of the scenario; instance already asserted above.
    }

    #[test]
    fn duplicate_type_name_is_rejected() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        types.add_type(&mut view, "X").unwrap();
        let err = types.add_type(&mut view, "X").unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTypeName { .. }));
        assert_eq!(types.get_type_by_name("X"), types.get_type_by_name("X"));
    }

    #[test]
    fn self_referential_make_child_reports_type_cycle() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        let cyclic = types.add_type(&mut view, "Cyclic").unwrap();
        let child = template::make_child(&mut view, cyclic, None, DynamicAttributes::new());
        composition::add_child(&mut view, cyclic, child, "self").unwrap();

        let err = types.instantiate(&mut view, "Cyclic", None).unwrap_err();
        assert!(matches!(err, GraphError::TypeCycle { .. }));
    }

    #[test]
    fn get_or_create_type_is_idempotent() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        let first = types.get_or_create_type(&mut view, "Y");
        let second = types.get_or_create_type(&mut view, "Y");
        assert_eq!(first, second);
        assert_eq!(types.get_type_by_name("Y"), Some(first));
    }

    #[test]
    fn owns_node_recognises_types_and_their_instances() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        let pad = types.add_type(&mut view, "Pad").unwrap();
        let instance = types.instantiate(&mut view, "Pad", None).unwrap();
        let stranger = view.insert_node(NodeKind::Generic, DynamicAttributes::new());

        assert!(types.owns_node(&view, pad));
        assert!(types.owns_node(&view, instance));
        assert!(!types.owns_node(&view, stranger));
    }

    #[test]
    fn type_subgraph_contains_only_registered_types() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        let pad = types.add_type(&mut view, "Pad").unwrap();
        let resistor = types.add_type(&mut view, "Resistor").unwrap();
        let _instance = types.instantiate(&mut view, "Pad", None).unwrap();

        let sub = types.get_type_subgraph(&view);
        assert_eq!(sub.iter_nodes().count(), 2);
        let _ = (pad, resistor);
    }

    #[test]
    fn type_instance_overview_counts_instances_per_name() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        types.add_type(&mut view, "Pad").unwrap();
        types.instantiate(&mut view, "Pad", None).unwrap();
        types.instantiate(&mut view, "Pad", None).unwrap();

        let overview = types.get_type_instance_overview(&view);
        assert_eq!(overview.get("Pad"), Some(&2));
    }

    #[test]
    fn subgraph_of_node_follows_composition_type_trait_and_pointer_but_not_interface() {
        let mut view = GraphView::new();
        let mut types = TypeGraph::new(&mut view);
        let pad = types.add_type(&mut view, "Pad").unwrap();
        let resistor = types.add_type(&mut view, "Resistor").unwrap();
        let pin1 = template::make_child(&mut view, pad, None, DynamicAttributes::new());
        composition::add_child(&mut view, resistor, pin1, "Pin1").unwrap();
        let instance = types.instantiate(&mut view, "Resistor", None).unwrap();

        let stray = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        interface::connect(&mut view, instance, stray).unwrap();

        let sub = TypeGraph::get_subgraph_of_node(&view, instance);
        // instance, its Pin1 child instance, their Type targets (Resistor, Pad),
        // and the Pin1 MakeChild template reached via Resistor's own Composition
        // edge. The InterfaceConnection edge to `stray` is not followed.
        assert_eq!(sub.iter_nodes().count(), 5);
        let _ = stray;
    }
}
