//! Query result structures

use crate::graph::{Edge, Node};

/// Result of a node query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Nodes on the requested page, highest computed priority first
    pub nodes: Vec<Node>,
    /// Number of matches before offset and limit were applied
    pub total_count: usize,
}

impl QueryResult {
    /// True when more matches exist past this page
    pub fn has_more(&self, offset: usize) -> bool {
        offset + self.nodes.len() < self.total_count
    }
}

/// Result of an edge query
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeQueryResult {
    /// Edges on the requested page, in insertion order
    pub edges: Vec<Edge>,
    pub total_count: usize,
}

impl EdgeQueryResult {
    pub fn has_more(&self, offset: usize) -> bool {
        offset + self.edges.len() < self.total_count
    }
}
