//! Crate-wide error taxonomy.
//!
//! Mirrors the leaf/aggregate split used by the wider federation-next
//! lineage (`SingleFederationError` plus a `#[from]`-composed wrapper):
//! one flat `thiserror` enum covers every failure kind the graph substrate
//! and the edge-kind modules can produce, and callers match on it directly
//! rather than downcasting a boxed trait object.

use crate::graph::{EdgeId, NodeId};

/// A single reference-chain hop that failed to resolve, carried for
/// diagnostics by [`GraphError::LinkResolutionFailed`].
pub type ReferencePath = Vec<String>;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Allocation failure. Only reachable from the handful of call sites
    /// that pre-size storage via `try_reserve` (`GraphView::reserve_*`);
    /// ordinary insertion cannot fail this way in safe Rust.
    #[error("out of memory")]
    OutOfMemory,

    /// An edge-kind accessor was called on an edge of a different kind.
    #[error("edge {edge:?} is not an instance of the requested kind")]
    InvalidEdgeKind { edge: EdgeId },

    /// A second composition child with the same identifier was added under
    /// the same parent.
    #[error("parent {parent:?} already has a child named {identifier:?}")]
    DuplicateChildIdentifier { parent: NodeId, identifier: String },

    /// A type name was registered twice on the same `TypeGraph`.
    #[error("type name {identifier:?} is already registered")]
    DuplicateTypeName { identifier: String },

    /// `TypeGraph::instantiate` was asked for a name with no registered type.
    #[error("no type is registered under name {identifier:?}")]
    UnknownTypeName { identifier: String },

    /// `try_get_trait` found more than one trait instance of the requested
    /// type on one owner.
    #[error("node {owner:?} has more than one trait instance of the requested type")]
    DuplicateTrait { owner: NodeId },

    /// An invariant check found two incoming composition edges into one
    /// node.
    #[error("node {child:?} has more than one composition parent")]
    MultipleCompositionParents { child: NodeId },

    /// `try_get_single_child_of_type` found more than one matching child.
    #[error("parent {parent:?} has more than one child of the requested type")]
    AmbiguousChild { parent: NodeId },

    /// A second incoming or outgoing `Next` edge was added to a node that
    /// already had one.
    #[error("node {node:?} already has a {direction} Next edge")]
    NextAlreadySet {
        node: NodeId,
        direction: NextDirection,
    },

    /// A second outgoing `Type` edge was added to a node that already had
    /// one (spec.md §8 invariant 4: "at most one outgoing Type edge").
    #[error("node {node:?} already has an outgoing Type edge")]
    TypeAlreadySet { node: NodeId },

    /// A `MakeLink` template's reference could not be resolved against the
    /// instance being built.
    #[error("failed to resolve reference path {path:?} from {base:?}")]
    LinkResolutionFailed { base: NodeId, path: ReferencePath },

    /// Instantiation detected a template whose `MakeChild` children recurse
    /// back into the same type, instead of recursing until the stack is
    /// exhausted.
    #[error("type {type_node:?} is involved in a cyclic template chain")]
    TypeCycle { type_node: NodeId },

    /// A dynamic attribute value did not match any supported `Literal`
    /// variant. Not currently reachable through the public API (every
    /// constructor of `Literal` is total), kept because `DynamicAttributes`
    /// is a boundary type and callers may grow new producers.
    #[error("unsupported literal type for attribute {key:?}")]
    InvalidLiteralType { key: String },

    /// A visitor callback returned `VisitResult::Error`.
    #[error("visitor callback reported an error: {0}")]
    Callback(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum NextDirection {
    #[strum(to_string = "incoming")]
    Incoming,
    #[strum(to_string = "outgoing")]
    Outgoing,
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Outcome of a visitor callback (spec §4.D shared operations).
///
/// Traversal short-circuits on `Stop` or `Error`, exactly like the
/// `Continue`/`Stop`/`Error` contract described for every `visit_*` function.
#[derive(Debug)]
pub enum VisitResult {
    Continue,
    Stop,
    Error(GraphError),
}

impl VisitResult {
    pub fn is_continue(&self) -> bool {
        matches!(self, VisitResult::Continue)
    }
}
