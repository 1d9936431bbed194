//! An in-memory typed property graph: the intermediate representation for
//! an electronics design system. Nodes are design entities (modules,
//! interfaces, parameters, traits, types); edges are typed relationships
//! between them. A [`type_graph::TypeGraph`] treats a subset of nodes as
//! templates describing how to instantiate concrete instance subgraphs.

pub mod builder;
pub mod edge_kind;
pub mod error;
pub mod graph;
pub mod literal;
pub mod type_graph;

pub use crate::builder::{EdgeCreationAttributes, NodeCreationAttributes};
pub use crate::error::{GraphError, Result, VisitResult};
pub use crate::graph::{BoundEdge, BoundNode, Edge, EdgeId, EdgeKind, GraphView, Node, NodeId, NodeKind};
pub use crate::literal::{DynamicAttributes, Literal};
pub use crate::type_graph::TypeGraph;
