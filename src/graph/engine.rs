//! GraphEngine: owner of many graphs, with optional persistence

use super::aggregate::Graph;
use super::edge::EdgeId;
use super::node::NodeId;
use crate::storage::{GraphStore, StorageError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Unique identifier for a graph managed by the engine
///
/// Serializes as a plain string (UUID or a semantic name like "team-alpha")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    /// Create a new random GraphId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a GraphId from a string (semantic ID)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GraphId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GraphId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Errors that can occur in engine operations
///
/// The graph itself reports absence through `Option`/`bool`; these variants
/// exist for callers that need a hard failure instead.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Owns a set of graphs keyed by [`GraphId`]
///
/// Each graph lives in a concurrent map shard. [`GraphEngine::mutate`] holds
/// the shard's write lock for the whole closure, so mutations of one graph
/// are serialized against each other and against [`GraphEngine::read`]
/// calls on it; reads of the same graph may run in parallel. Closures must
/// not call back into the engine for the same graph.
///
/// When a store is attached, every successful mutation writes the graph's
/// snapshot back to it. [`GraphEngine::upsert_graph`] and
/// [`GraphEngine::remove_graph`] hold the same shard lock across their
/// store write, so memory and store change together.
#[derive(Default)]
pub struct GraphEngine {
    graphs: DashMap<GraphId, Graph>,
    store: Option<Arc<dyn GraphStore>>,
}

impl std::fmt::Debug for GraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphEngine")
            .field("graphs", &self.graphs.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl GraphEngine {
    /// Create an in-memory engine with no store
    pub fn new() -> Self {
        Self {
            graphs: DashMap::new(),
            store: None,
        }
    }

    /// Create an engine that persists through `store`
    pub fn with_store(store: Arc<dyn GraphStore>) -> Self {
        Self {
            graphs: DashMap::new(),
            store: Some(store),
        }
    }

    /// Load every graph the store knows about, replacing in-memory copies
    ///
    /// Returns the number of graphs loaded; zero without a store.
    #[instrument(skip(self))]
    pub fn load_all(&self) -> GraphResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let mut loaded = 0;
        for id in store.list_graphs()? {
            if let Some(snapshot) = store.load_graph(&id)? {
                self.graphs.insert(id, Graph::from_snapshot(snapshot));
                loaded += 1;
            }
        }
        info!(loaded, "loaded graphs from store");
        Ok(loaded)
    }

    /// Register a new empty graph and return its id
    pub fn create_graph(&self) -> GraphResult<GraphId> {
        self.upsert_graph(GraphId::new(), Graph::new())
    }

    /// Insert or replace a graph
    #[instrument(skip(self, graph), fields(graph_id = %id))]
    pub fn upsert_graph(&self, id: GraphId, graph: Graph) -> GraphResult<GraphId> {
        // The entry holds the shard lock until the map is updated
        let entry = self.graphs.entry(id.clone());
        self.persist(&id, &graph)?;
        entry.insert(graph);
        debug!("upserted graph");
        Ok(id)
    }

    /// Clone of a graph, if present
    pub fn get_graph(&self, id: &GraphId) -> Option<Graph> {
        self.graphs.get(id).map(|r| r.clone())
    }

    /// Remove a graph from the engine and the store
    #[instrument(skip(self), fields(graph_id = %id))]
    pub fn remove_graph(&self, id: &GraphId) -> GraphResult<Option<Graph>> {
        let entry = self.graphs.entry(id.clone());
        if let Some(store) = &self.store {
            store.delete_graph(id)?;
        }
        Ok(match entry {
            Entry::Occupied(occupied) => Some(occupied.remove()),
            Entry::Vacant(_) => None,
        })
    }

    /// All graph ids, sorted
    pub fn list_graphs(&self) -> Vec<GraphId> {
        let mut ids: Vec<GraphId> = self.graphs.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn has_graph(&self, id: &GraphId) -> bool {
        self.graphs.contains_key(id)
    }

    /// Run a read-only closure against a graph
    pub fn read<R>(&self, id: &GraphId, f: impl FnOnce(&Graph) -> R) -> GraphResult<R> {
        let graph = self
            .graphs
            .get(id)
            .ok_or_else(|| GraphError::GraphNotFound(id.clone()))?;
        Ok(f(&*graph))
    }

    /// Run a mutating closure against a graph, then persist it
    pub fn mutate<R>(&self, id: &GraphId, f: impl FnOnce(&mut Graph) -> R) -> GraphResult<R> {
        self.try_mutate(id, |graph| Ok(f(graph)))
    }

    /// Like [`GraphEngine::mutate`] for fallible closures
    ///
    /// Nothing is persisted when the closure fails; in-memory changes it
    /// made before failing are kept.
    #[instrument(skip(self, f), fields(graph_id = %id))]
    pub fn try_mutate<R>(
        &self,
        id: &GraphId,
        f: impl FnOnce(&mut Graph) -> GraphResult<R>,
    ) -> GraphResult<R> {
        let mut graph = self
            .graphs
            .get_mut(id)
            .ok_or_else(|| GraphError::GraphNotFound(id.clone()))?;
        let result = f(&mut *graph)?;
        self.persist(id, &*graph)?;
        Ok(result)
    }

    fn persist(&self, id: &GraphId, graph: &Graph) -> GraphResult<()> {
        if let Some(store) = &self.store {
            store.save_graph(id, &graph.snapshot())?;
        }
        Ok(())
    }
}
