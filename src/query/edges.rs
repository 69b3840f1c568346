//! Filtered, paginated edge queries

use super::find::DEFAULT_LIMIT;
use super::types::EdgeQueryResult;
use crate::graph::{Edge, EdgeType, Graph, NodeId};

/// Query for finding edges by endpoint and type
#[derive(Debug, Clone, Default)]
pub struct EdgeQuery {
    pub source: Option<NodeId>,
    pub target: Option<NodeId>,
    pub edge_type: Option<EdgeType>,
    /// Maximum number of results; `DEFAULT_LIMIT` when unset
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl EdgeQuery {
    /// Create a new empty query (matches all edges)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<NodeId>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<NodeId>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_edge_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = Some(edge_type);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Execute the query against a graph, keeping edge insertion order
    pub fn execute(&self, graph: &Graph) -> EdgeQueryResult {
        let matches: Vec<&Edge> = graph.edges().filter(|edge| self.matches(edge)).collect();
        let total_count = matches.len();
        let edges = matches
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(DEFAULT_LIMIT))
            .cloned()
            .collect();

        EdgeQueryResult { edges, total_count }
    }

    fn matches(&self, edge: &Edge) -> bool {
        self.source.as_ref().map_or(true, |s| &edge.source == s)
            && self.target.as_ref().map_or(true, |t| &edge.target == t)
            && self.edge_type.map_or(true, |t| edge.edge_type == t)
    }
}
