//! Storage trait definitions

use crate::graph::{Edge, EdgeId, GraphId, GraphSnapshot, Node, NodeId};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph storage backends
///
/// A store holds plain node and edge records per graph. It never interprets
/// them: dependency bookkeeping and cascades are the graph's job, and the
/// record-level operations below write exactly the record they are given.
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple threads.
pub trait GraphStore: Send + Sync {
    // === Graph Operations ===

    /// Create or replace a graph's records
    fn save_graph(&self, id: &GraphId, snapshot: &GraphSnapshot) -> StorageResult<()>;

    /// Load a graph's records by ID
    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<GraphSnapshot>>;

    /// Delete a graph and all its records
    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool>;

    /// List all graph IDs
    fn list_graphs(&self) -> StorageResult<Vec<GraphId>>;

    // === Record Operations ===

    /// Insert or replace one node record
    fn save_node(&self, graph_id: &GraphId, node: &Node) -> StorageResult<()> {
        self.update_graph(graph_id, &mut |snapshot: &mut GraphSnapshot| {
            match snapshot.nodes.iter_mut().find(|n| n.id() == node.id()) {
                Some(existing) => *existing = node.clone(),
                None => snapshot.nodes.push(node.clone()),
            }
            true
        })
        .map(|_| ())
    }

    /// Delete one node record; edges referencing it are left alone
    fn delete_node(&self, graph_id: &GraphId, node_id: &NodeId) -> StorageResult<bool> {
        self.update_graph(graph_id, &mut |snapshot: &mut GraphSnapshot| {
            let before = snapshot.nodes.len();
            snapshot.nodes.retain(|n| n.id() != node_id);
            snapshot.nodes.len() != before
        })
    }

    /// Insert or replace one edge record
    fn save_edge(&self, graph_id: &GraphId, edge: &Edge) -> StorageResult<()> {
        self.update_graph(graph_id, &mut |snapshot: &mut GraphSnapshot| {
            match snapshot.edges.iter_mut().find(|e| e.id == edge.id) {
                Some(existing) => *existing = edge.clone(),
                None => snapshot.edges.push(edge.clone()),
            }
            true
        })
        .map(|_| ())
    }

    /// Delete one edge record
    fn delete_edge(&self, graph_id: &GraphId, edge_id: &EdgeId) -> StorageResult<bool> {
        self.update_graph(graph_id, &mut |snapshot: &mut GraphSnapshot| {
            let before = snapshot.edges.len();
            snapshot.edges.retain(|e| &e.id != edge_id);
            snapshot.edges.len() != before
        })
    }

    /// Read-modify-write a stored graph
    ///
    /// `apply` returns whether it changed anything; the graph is written
    /// back only in that case. The default implementation is not atomic
    /// with respect to other writers; backends override it when they can
    /// hold a lock across the cycle.
    fn update_graph(
        &self,
        id: &GraphId,
        apply: &mut dyn FnMut(&mut GraphSnapshot) -> bool,
    ) -> StorageResult<bool> {
        let mut snapshot = self
            .load_graph(id)?
            .ok_or_else(|| StorageError::GraphNotFound(id.clone()))?;
        let changed = apply(&mut snapshot);
        if changed {
            self.save_graph(id, &snapshot)?;
        }
        Ok(changed)
    }
}
