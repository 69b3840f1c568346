//! GraphDone: collaborative work graph engine
//!
//! Work items live as nodes in a directed graph. Each node carries a
//! democratic priority blended from executive, individual, and community
//! scores, and a spherical position whose radius shrinks as priority grows.
//!
//! # Core Concepts
//!
//! - **Nodes**: Outcomes, tasks, milestones, and ideas with status, contributors, and priority
//! - **Edges**: Typed, weighted relationships; dependency edges also update node bookkeeping
//! - **Graphs**: Aggregates that keep nodes, edges, and adjacency consistent
//!
//! # Example
//!
//! ```
//! use graphdone::{Edge, EdgeType, Graph, Node, NodeType};
//!
//! let mut graph = Graph::new();
//! let design = graph.add_node(Node::new("Design", NodeType::Task)).id().clone();
//! let ship = graph.add_node(Node::new("Ship", NodeType::Milestone)).id().clone();
//! graph.add_edge(Edge::new(design.clone(), ship.clone(), EdgeType::Dependency, 1.0));
//!
//! assert_eq!(graph.find_path(&design, &ship), Some(vec![design, ship]));
//! ```

pub mod config;
mod graph;
pub mod query;
pub mod storage;

pub use config::{ConfigError, EngineConfig, LogFormat};
pub use graph::{
    CartesianCoordinate, ContributorId, Edge, EdgeId, EdgeType, Graph, GraphEngine, GraphError,
    GraphId, GraphResult, GraphSnapshot, Metadata, Node, NodeBuilder, NodeId, NodeStatus,
    NodeType, Priority, PriorityCalculator, PriorityUpdate, SphericalCoordinate,
    COMMUNITY_WEIGHT, EXECUTIVE_WEIGHT, INDIVIDUAL_WEIGHT,
};
pub use query::{EdgeQuery, EdgeQueryResult, GraphStats, NodeQuery, QueryResult};
pub use storage::{GraphStore, JsonFileStore, MemoryStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
