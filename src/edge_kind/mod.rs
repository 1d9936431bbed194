//! The edge-kind taxonomy.
//!
//! Each submodule is a stateless namespace of free functions over
//! [`crate::graph::GraphView`] — no virtual dispatch, no trait object, just
//! a tag comparison against `EdgeKind`'s associated constants. Visitor
//! callbacks are plain `FnMut` closures rather than a `(ctx, item)` pair:
//! a closure's captured environment already serves as that context, so
//! there is nothing left to pass separately. See DESIGN.md for the full
//! note.

pub mod composition;
pub mod interface;
pub mod next;
pub mod operand;
pub mod pointer;
pub mod trait_edge;
pub mod type_edge;

use crate::error::GraphError;
use crate::graph::{BoundEdge, EdgeId, EdgeKind};

/// Shared assertion used by every kind module's accessors: fail with
/// `InvalidEdgeKind` rather than panicking when called on the wrong kind of
/// edge, since callers can legitimately hold an `EdgeId` of unknown
/// provenance (e.g. from generic iteration over `iter_edges`).
pub(crate) fn require_kind(edge: BoundEdge<'_>, kind: EdgeKind) -> Result<(), GraphError> {
    if edge.kind() == kind {
        Ok(())
    } else {
        Err(GraphError::InvalidEdgeKind { edge: edge.id() })
    }
}

pub(crate) fn require_kind_id(
    view: &crate::graph::GraphView,
    edge: EdgeId,
    kind: EdgeKind,
) -> Result<(), GraphError> {
    require_kind(view.bind_edge(edge), kind)
}
