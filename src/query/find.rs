//! Filtered, paginated node queries

use super::types::QueryResult;
use crate::graph::{ContributorId, Graph, Node, NodeStatus, NodeType};

/// Page size used when a query sets no limit
pub const DEFAULT_LIMIT: usize = 50;

/// Query for finding nodes by type, status, contributor, and priority
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    pub node_type: Option<NodeType>,
    pub status: Option<NodeStatus>,
    pub contributor: Option<ContributorId>,
    /// Minimum computed priority, inclusive
    pub priority_threshold: Option<f64>,
    /// Maximum number of results; `DEFAULT_LIMIT` when unset
    pub limit: Option<usize>,
    /// Number of results to skip
    pub offset: Option<usize>,
}

impl NodeQuery {
    /// Create a new empty query (matches all nodes)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_contributor(mut self, contributor: impl Into<ContributorId>) -> Self {
        self.contributor = Some(contributor.into());
        self
    }

    pub fn with_priority_threshold(mut self, threshold: f64) -> Self {
        self.priority_threshold = Some(threshold);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results (for pagination)
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Execute the query against a graph
    ///
    /// Matches are ordered by computed priority, highest first; ties keep
    /// insertion order.
    pub fn execute(&self, graph: &Graph) -> QueryResult {
        let mut matches: Vec<&Node> = graph.nodes().filter(|node| self.matches(node)).collect();
        matches.sort_by(|a, b| b.priority().computed.total_cmp(&a.priority().computed));

        let total_count = matches.len();
        let nodes = matches
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(DEFAULT_LIMIT))
            .cloned()
            .collect();

        QueryResult { nodes, total_count }
    }

    fn matches(&self, node: &Node) -> bool {
        if self.node_type.is_some_and(|t| node.node_type() != t) {
            return false;
        }
        if self.status.is_some_and(|s| node.status() != s) {
            return false;
        }
        if let Some(ref contributor) = self.contributor {
            if !node.contributors().contains(contributor) {
                return false;
            }
        }
        if let Some(threshold) = self.priority_threshold {
            if node.priority().computed < threshold {
                return false;
            }
        }
        true
    }
}
