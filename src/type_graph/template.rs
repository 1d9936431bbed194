//! Template nodes consumed by the instantiation engine: `MakeChild`
//! (composition template), `MakeLink` (edge template), and the
//! `ChildReference` chain used to address nodes relative to an instance
//! being built.
//!
//! None of these are distinct Rust types — `NodeKind::MakeChild` /
//! `MakeLink` / `ChildReference` nodes carry their template payload in their
//! own `DynamicAttributes` under reserved keys, the same storage every other
//! node already has. That avoids inventing a second attribute-map shape just
//! for templates.

use crate::builder::{EdgeCreationAttributes, NodeCreationAttributes};
use crate::edge_kind::{composition, next};
use crate::error::ReferencePath;
use crate::graph::{EdgeKind, GraphView, NodeId, NodeKind};
use crate::literal::{DynamicAttributes, Literal};

const MAKE_CHILD_TYPE_KEY: &str = "__make_child_type__";
const MAKE_CHILD_IDENTIFIER_KEY: &str = "__make_child_identifier__";

const MAKE_LINK_LHS_KEY: &str = "__make_link_lhs__";
const MAKE_LINK_RHS_KEY: &str = "__make_link_rhs__";
const MAKE_LINK_EDGE_KIND_KEY: &str = "__make_link_edge_kind__";
const MAKE_LINK_EDGE_DIRECTIONAL_KEY: &str = "__make_link_edge_directional__";
const MAKE_LINK_EDGE_NAME_KEY: &str = "__make_link_edge_name__";
const MAKE_LINK_EDGE_ORDER_KEY: &str = "__make_link_edge_order__";

const CHILD_REFERENCE_IDENTIFIER_KEY: &str = "__child_reference_identifier__";

fn node_id_to_literal(id: NodeId) -> Literal {
    Literal::Int(id.index() as i64)
}

fn literal_to_node_id(literal: &Literal) -> Option<NodeId> {
    literal.as_int().map(|i| NodeId::new(i as u32))
}

/// Builds a `MakeChild` node: placed under a type via a `Composition` edge
/// named by `identifier` (or left for the composition edge itself to name).
pub fn make_child(
    view: &mut GraphView,
    child_type_node: NodeId,
    identifier: Option<String>,
    extra_attributes: DynamicAttributes,
) -> NodeId {
    let mut attrs = extra_attributes;
    attrs.put(MAKE_CHILD_TYPE_KEY, node_id_to_literal(child_type_node));
    if let Some(identifier) = identifier {
        attrs.put(MAKE_CHILD_IDENTIFIER_KEY, identifier);
    }
    view.insert_node(NodeKind::MakeChild, attrs)
}

pub fn make_child_type(view: &GraphView, make_child_node: NodeId) -> NodeId {
    literal_to_node_id(
        view.node(make_child_node)
            .attributes()
            .get(MAKE_CHILD_TYPE_KEY)
            .expect("MakeChild node always carries a child_type_node attribute"),
    )
    .expect("child_type_node attribute is always an Int literal")
}

pub fn make_child_identifier(view: &GraphView, make_child_node: NodeId) -> Option<String> {
    view.node(make_child_node)
        .attributes()
        .get(MAKE_CHILD_IDENTIFIER_KEY)
        .and_then(Literal::as_str)
        .map(str::to_owned)
}

/// The `NodeCreationAttributes` attached to a `MakeChild` node: every
/// attribute on the node except the two reserved control keys.
pub fn node_creation_attributes_of(view: &GraphView, make_child_node: NodeId) -> NodeCreationAttributes {
    let mut dynamic = DynamicAttributes::new();
    for (key, value) in view.node(make_child_node).attributes().iterate() {
        if key == MAKE_CHILD_TYPE_KEY || key == MAKE_CHILD_IDENTIFIER_KEY {
            continue;
        }
        dynamic.put(key.to_owned(), value.clone());
    }
    if dynamic.is_empty() {
        NodeCreationAttributes::new()
    } else {
        NodeCreationAttributes::new().with_dynamic(dynamic)
    }
}

/// Builds a `MakeLink` node: placed under a type via an `Operand` edge.
/// `edge_attrs` is flattened into the node's own attribute map via reserved
/// keys so no second attribute-map shape is needed.
pub fn make_link(
    view: &mut GraphView,
    lhs_reference_node: NodeId,
    rhs_reference_node: NodeId,
    edge_attrs: EdgeCreationAttributes,
) -> NodeId {
    // `create_edge` gives us back every field of the builder through `Edge`'s
    // public accessors without needing getters on `EdgeCreationAttributes`
    // itself; the endpoints passed in are discarded; only the shape matters.
    let prototype = edge_attrs.create_edge(lhs_reference_node, rhs_reference_node);

    let mut attrs = prototype.attributes().clone();
    attrs.put(MAKE_LINK_LHS_KEY, node_id_to_literal(lhs_reference_node));
    attrs.put(MAKE_LINK_RHS_KEY, node_id_to_literal(rhs_reference_node));
    attrs.put(MAKE_LINK_EDGE_KIND_KEY, prototype.kind().0 as i64);
    attrs.put(MAKE_LINK_EDGE_DIRECTIONAL_KEY, prototype.directional());
    if let Some(name) = prototype.name() {
        attrs.put(MAKE_LINK_EDGE_NAME_KEY, name);
    }
    if let Some(order) = prototype.order() {
        attrs.put(MAKE_LINK_EDGE_ORDER_KEY, order as i64);
    }

    view.insert_node(NodeKind::MakeLink, attrs)
}

pub fn make_link_lhs(view: &GraphView, make_link_node: NodeId) -> NodeId {
    literal_to_node_id(
        view.node(make_link_node)
            .attributes()
            .get(MAKE_LINK_LHS_KEY)
            .expect("MakeLink node always carries lhs_reference_node"),
    )
    .expect("lhs_reference_node attribute is always an Int literal")
}

pub fn make_link_rhs(view: &GraphView, make_link_node: NodeId) -> NodeId {
    literal_to_node_id(
        view.node(make_link_node)
            .attributes()
            .get(MAKE_LINK_RHS_KEY)
            .expect("MakeLink node always carries rhs_reference_node"),
    )
    .expect("rhs_reference_node attribute is always an Int literal")
}

/// Reconstructs the `EdgeCreationAttributes` stashed on a `MakeLink` node.
pub fn edge_creation_attributes_of(view: &GraphView, make_link_node: NodeId) -> EdgeCreationAttributes {
    let node_attrs = view.node(make_link_node).attributes();

    let kind_value = node_attrs
        .get(MAKE_LINK_EDGE_KIND_KEY)
        .and_then(Literal::as_int)
        .expect("MakeLink node always carries an edge kind");
    let mut builder = EdgeCreationAttributes::new(EdgeKind(kind_value as u32));

    if let Some(directional) = node_attrs.get(MAKE_LINK_EDGE_DIRECTIONAL_KEY).and_then(Literal::as_bool) {
        builder = builder.with_directional(directional);
    }
    if let Some(name) = node_attrs.get(MAKE_LINK_EDGE_NAME_KEY).and_then(Literal::as_str) {
        builder = builder.with_name(name.to_owned());
    }
    if let Some(order) = node_attrs.get(MAKE_LINK_EDGE_ORDER_KEY).and_then(Literal::as_int) {
        builder = builder.with_order(order as u32);
    }

    let mut extra = DynamicAttributes::new();
    for (key, value) in node_attrs.iterate() {
        let reserved = matches!(
            key,
            MAKE_LINK_LHS_KEY
                | MAKE_LINK_RHS_KEY
                | MAKE_LINK_EDGE_KIND_KEY
                | MAKE_LINK_EDGE_DIRECTIONAL_KEY
                | MAKE_LINK_EDGE_NAME_KEY
                | MAKE_LINK_EDGE_ORDER_KEY
        );
        if !reserved {
            extra.put(key.to_owned(), value.clone());
        }
    }
    builder.with_attributes(extra)
}

/// Inserts a chain of `ChildReference` nodes, one per path segment, linked
/// by `Next` edges. Returns the head of the chain.
pub fn add_reference(view: &mut GraphView, path: &[impl AsRef<str>]) -> NodeId {
    assert!(!path.is_empty(), "a reference chain needs at least one segment");

    let mut head = None;
    let mut previous = None;
    for segment in path {
        let mut attrs = DynamicAttributes::new();
        attrs.put(CHILD_REFERENCE_IDENTIFIER_KEY, segment.as_ref());
        let node = view.insert_node(NodeKind::ChildReference, attrs);
        if head.is_none() {
            head = Some(node);
        }
        if let Some(prev) = previous {
            next::link(view, prev, node).expect("a freshly built chain cannot collide with an existing Next edge");
        }
        previous = Some(node);
    }
    head.expect("path is non-empty")
}

pub fn child_reference_identifier(view: &GraphView, reference_node: NodeId) -> Option<String> {
    view.node(reference_node)
        .attributes()
        .get(CHILD_REFERENCE_IDENTIFIER_KEY)
        .and_then(Literal::as_str)
        .map(str::to_owned)
}

/// Walks the reference chain starting at `reference_node`, resolving each
/// segment's identifier against `Composition.get_child_by_identifier`
/// starting from `base`. `None` if any hop fails.
pub fn resolve(view: &GraphView, reference_node: NodeId, base: NodeId) -> Option<NodeId> {
    let mut current = base;
    let mut segment = Some(reference_node);
    while let Some(seg) = segment {
        let identifier = child_reference_identifier(view, seg)?;
        current = composition::get_child_by_identifier(view, current, &identifier)?.id();
        segment = next::get_next(view, seg);
    }
    Some(current)
}

/// The sequence of identifiers a reference chain would walk, for
/// `LinkResolutionFailed` diagnostics.
pub fn reference_path(view: &GraphView, reference_node: NodeId) -> ReferencePath {
    let mut path = Vec::new();
    let mut segment = Some(reference_node);
    while let Some(seg) = segment {
        if let Some(identifier) = child_reference_identifier(view, seg) {
            path.push(identifier);
        }
        segment = next::get_next(view, seg);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_kind::composition;

    fn node(view: &mut GraphView) -> NodeId {
        view.insert_node(NodeKind::Generic, DynamicAttributes::new())
    }

    #[test]
    fn make_child_round_trips_type_and_identifier() {
        let mut view = GraphView::new();
        let child_type = node(&mut view);
        let mc = make_child(&mut view, child_type, Some("pin".into()), DynamicAttributes::new());
        assert_eq!(make_child_type(&view, mc), child_type);
        assert_eq!(make_child_identifier(&view, mc), Some("pin".to_string()));
    }

    #[test]
    fn make_child_preserves_extra_attributes_as_node_creation_attributes() {
        let mut view = GraphView::new();
        let child_type = node(&mut view);
        let mut extra = DynamicAttributes::new();
        extra.put("default_ohms", Literal::Int(220));
        let mc = make_child(&mut view, child_type, None, extra);
        let nca = node_creation_attributes_of(&view, mc);
        assert_eq!(
            nca.dynamic().and_then(|d| d.get("default_ohms")),
            Some(&Literal::Int(220))
        );
    }

    #[test]
    fn make_link_round_trips_edge_shape() {
        let mut view = GraphView::new();
        let lhs = node(&mut view);
        let rhs = node(&mut view);
        let edge_attrs = EdgeCreationAttributes::new(EdgeKind::INTERFACE_CONNECTION).with_name("conn");
        let ml = make_link(&mut view, lhs, rhs, edge_attrs);

        assert_eq!(make_link_lhs(&view, ml), lhs);
        assert_eq!(make_link_rhs(&view, ml), rhs);
        let rebuilt = edge_creation_attributes_of(&view, ml);
        assert_eq!(rebuilt.get_tid(), EdgeKind::INTERFACE_CONNECTION);
    }

    #[test]
    fn resolve_walks_the_chain_via_composition() {
        let mut view = GraphView::new();
        let root = node(&mut view);
        let a = node(&mut view);
        let b = node(&mut view);
        composition::add_child(&mut view, root, a, "a").unwrap();
        composition::add_child(&mut view, a, b, "b").unwrap();

        let reference = add_reference(&mut view, &["a", "b"]);
        assert_eq!(resolve(&view, reference, root), Some(b));
    }

    #[test]
    fn resolve_fails_on_missing_hop() {
        let mut view = GraphView::new();
        let root = node(&mut view);
        let reference = add_reference(&mut view, &["missing"]);
        assert_eq!(resolve(&view, reference, root), None);
    }
}
