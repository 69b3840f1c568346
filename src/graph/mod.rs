//! Core graph data structures

mod aggregate;
mod edge;
mod engine;
mod node;
mod priority;
mod traversal;
mod types;


pub use aggregate::{Graph, GraphSnapshot};
pub use edge::{Edge, EdgeId};
pub use engine::{GraphEngine, GraphError, GraphId, GraphResult};
pub use node::{Node, NodeBuilder, NodeId};
pub use priority::{
    Priority, PriorityCalculator, PriorityUpdate, COMMUNITY_WEIGHT, EXECUTIVE_WEIGHT,
    INDIVIDUAL_WEIGHT,
};
pub use types::{
    CartesianCoordinate, ContributorId, EdgeType, Metadata, NodeStatus, NodeType,
    SphericalCoordinate,
};
