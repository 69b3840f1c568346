//! Edge representation: a typed, weighted, directed relationship

use super::node::NodeId;
use super::priority::clamp01;
use super::types::{EdgeType, Metadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Create a new random EdgeId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an EdgeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A directed edge between two node ids
///
/// Endpoints are not checked against any graph; referential integrity is
/// the owning graph's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    /// Relationship strength, nominally in [0, 1]
    ///
    /// Not clamped at construction; [`Edge::update_weight`] clamps.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Edge {
    /// Create a new edge with a generated id
    pub fn new(source: NodeId, target: NodeId, edge_type: EdgeType, weight: f64) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            target,
            edge_type,
            weight,
            metadata: None,
        }
    }

    /// Replace the generated id with a caller-supplied one
    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the weight, clamped to [0, 1]
    pub fn update_weight(&mut self, weight: f64) {
        self.weight = clamp01(weight);
    }

    /// A new edge pointing the other way, with a fresh id
    ///
    /// The copy is not registered in any graph.
    pub fn reverse(&self) -> Edge {
        Edge {
            id: EdgeId::new(),
            source: self.target.clone(),
            target: self.source.clone(),
            edge_type: self.edge_type,
            weight: self.weight,
            metadata: self.metadata.clone(),
        }
    }

    pub fn is_dependency(&self) -> bool {
        self.edge_type == EdgeType::Dependency
    }

    /// Whether `node_id` is either endpoint
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}
