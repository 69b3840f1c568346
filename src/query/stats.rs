//! Whole-graph summary statistics

use crate::graph::Graph;
use serde::Serialize;

/// Counts and averages over one graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Mean computed priority; 0 for an empty graph
    pub avg_priority: f64,
    /// Number of cycles reported by cycle detection
    pub cycle_count: usize,
}

impl GraphStats {
    pub fn compute(graph: &Graph) -> Self {
        let node_count = graph.node_count();
        let avg_priority = if node_count == 0 {
            0.0
        } else {
            graph.nodes().map(|n| n.priority().computed).sum::<f64>() / node_count as f64
        };

        Self {
            node_count,
            edge_count: graph.edge_count(),
            avg_priority,
            cycle_count: graph.detect_cycles().len(),
        }
    }
}
