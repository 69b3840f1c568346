//! Shared helpers for integration tests
//!
//! Graphs here use readable string ids so assertions can name nodes
//! directly.

#![allow(dead_code)]

use graphdone::{Edge, EdgeId, EdgeType, Graph, Node, NodeId, NodeType};

pub fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

/// Add a task node with a fixed id and equal priority inputs
pub fn add_task(graph: &mut Graph, node_id: &str, priority: f64) -> NodeId {
    let node = Node::builder(node_id.to_uppercase(), NodeType::Task)
        .id(node_id)
        .priority(priority, priority, priority)
        .build();
    graph.add_node(node).id().clone()
}

/// Add a dependency edge `source -> target` with id `source->target`
pub fn depend(graph: &mut Graph, source: &str, target: &str) -> EdgeId {
    let edge = Edge::new(id(source), id(target), EdgeType::Dependency, 1.0)
        .with_id(format!("{source}->{target}"));
    graph.add_edge(edge).id.clone()
}

/// Build a graph of task nodes joined by dependency edges
///
/// Every name mentioned in `edges` becomes a node with priority 0.5.
pub fn graph_with_edges(edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for (source, target) in edges {
        for name in [source, target] {
            if !graph.contains_node(&id(name)) {
                add_task(&mut graph, name, 0.5);
            }
        }
    }
    for (source, target) in edges {
        depend(&mut graph, source, target);
    }
    graph
}

/// Node ids as plain strings, for compact assertions
pub fn names(ids: &[NodeId]) -> Vec<&str> {
    ids.iter().map(NodeId::as_str).collect()
}
