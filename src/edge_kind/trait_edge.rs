//! `Trait` edges (owner → trait-instance), plus the companion operations
//! on trait-*type* nodes.
//!
//! `add_trait_to` needs the instantiation engine (to turn a trait type into
//! a fresh instance), so this module depends on `crate::type_graph`; the
//! engine in turn calls back into the non-recursive half of this module
//! (`is_trait_type`, `add_trait_instance_to`) to splice the resulting
//! instance in. Both directions exist but call different functions, so
//! there's no infinite loop — just the two modules being each other's
//! collaborators, same as `composition`/`type_edge` are for each other.

use crate::builder::EdgeCreationAttributes;
use crate::error::{GraphError, Result, VisitResult};
use crate::graph::{BoundEdge, BoundNode, EdgeId, EdgeKind, GraphView, NodeId};
use crate::literal::DynamicAttributes;
use crate::type_graph::TypeGraph;

use super::type_edge;

pub const TID: EdgeKind = EdgeKind::TRAIT;

const TRAIT_FLAG_KEY: &str = "__trait__";

pub fn is_instance(edge: BoundEdge<'_>) -> bool {
    edge.kind() == TID
}

pub fn build() -> EdgeCreationAttributes {
    EdgeCreationAttributes::new(TID)
}

/// Marks `type_node` as attachable to other nodes via `Trait` edges.
pub fn mark_as_trait(view: &mut GraphView, type_node: NodeId) {
    view.node_mut(type_node).attributes_mut().put(TRAIT_FLAG_KEY, true);
}

pub fn is_trait_type(view: &GraphView, type_node: NodeId) -> bool {
    view.node(type_node)
        .attributes()
        .get(TRAIT_FLAG_KEY)
        .and_then(|literal| literal.as_bool())
        .unwrap_or(false)
}

/// Attaches an already-built trait instance to `target`.
pub fn add_trait_instance_to(
    view: &mut GraphView,
    target: NodeId,
    trait_instance: NodeId,
) -> Result<EdgeId> {
    build().insert_edge(view, target, trait_instance)
}

/// Instantiates `trait_type` into a fresh trait-instance node and attaches
/// it to `target` via a `Trait` edge.
pub fn add_trait_to(
    type_graph: &TypeGraph,
    view: &mut GraphView,
    target: NodeId,
    trait_type: NodeId,
) -> Result<NodeId> {
    let instance = type_graph.instantiate_node(view, trait_type, None)?;
    add_trait_instance_to(view, target, instance)?;
    Ok(instance)
}

/// The trait instance on `target` whose type is `trait_type`, or `None`.
/// `DuplicateTrait` if more than one instance matches.
pub fn try_get_trait(
    view: &GraphView,
    target: NodeId,
    trait_type: NodeId,
) -> Result<Option<NodeId>> {
    let mut found = None;
    for edge_id in view.iter_out_edges(target, Some(TID)) {
        let instance = view.edge(edge_id).target();
        if type_edge::is_node_instance_of(view, instance, trait_type) {
            if found.is_some() {
                return Err(GraphError::DuplicateTrait { owner: target });
            }
            found = Some(instance);
        }
    }
    Ok(found)
}

/// Every node that owns a trait instance of `trait_type`, reached via
/// `trait_type → instances (Type) → owners (Trait)`.
pub fn visit_implementers(
    view: &GraphView,
    trait_type: NodeId,
    mut f: impl FnMut(BoundNode<'_>) -> VisitResult,
) -> VisitResult {
    for type_edge_id in view.iter_in_edges(trait_type, Some(type_edge::TID)) {
        let instance = view.edge(type_edge_id).source();
        for trait_edge_id in view.iter_in_edges(instance, Some(TID)) {
            let owner = view.edge(trait_edge_id).source();
            match f(view.bind(owner)) {
                VisitResult::Continue => continue,
                other => return other,
            }
        }
    }
    VisitResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    #[test]
    fn mark_and_query_trait_flag() {
        let mut view = GraphView::new();
        let type_node = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        assert!(!is_trait_type(&view, type_node));
        mark_as_trait(&mut view, type_node);
        assert!(is_trait_type(&view, type_node));
    }

    #[test]
    fn duplicate_trait_instances_are_detected() {
        let mut view = GraphView::new();
        let owner = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let trait_type = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let instance_a = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let instance_b = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        type_edge::set_type(&mut view, instance_a, trait_type).unwrap();
        type_edge::set_type(&mut view, instance_b, trait_type).unwrap();
        add_trait_instance_to(&mut view, owner, instance_a).unwrap();
        add_trait_instance_to(&mut view, owner, instance_b).unwrap();

        let err = try_get_trait(&view, owner, trait_type).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateTrait { .. }));
    }

    #[test]
    fn visit_implementers_visits_each_owner_once() {
        let mut view = GraphView::new();
        let owner = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let trait_type = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        let instance = view.insert_node(NodeKind::Generic, DynamicAttributes::new());
        type_edge::set_type(&mut view, instance, trait_type).unwrap();
        add_trait_instance_to(&mut view, owner, instance).unwrap();

        let mut owners = Vec::new();
        visit_implementers(&view, trait_type, |node| {
            owners.push(node.id());
            VisitResult::Continue
        });
        assert_eq!(owners, vec![owner]);
    }
}
