//! Shared value types: node/edge classifications, coordinates, metadata

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque caller-defined key/value data, passed through unmodified
pub type Metadata = HashMap<String, serde_json::Value>;

/// Identifier of a human or agent contributing to a node
///
/// Caller-defined; built with `From<&str>` or `From<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(String);

impl ContributorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContributorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContributorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContributorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of work a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Outcome,
    Task,
    Milestone,
    Idea,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Outcome => write!(f, "outcome"),
            NodeType::Task => write!(f, "task"),
            NodeType::Milestone => write!(f, "milestone"),
            NodeType::Idea => write!(f, "idea"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outcome" => Ok(NodeType::Outcome),
            "task" => Ok(NodeType::Task),
            "milestone" => Ok(NodeType::Milestone),
            "idea" => Ok(NodeType::Idea),
            other => Err(format!("unknown node type: {}", other)),
        }
    }
}

/// Lifecycle status of a node
///
/// No transition rules are enforced; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Proposed,
    Active,
    InProgress,
    Blocked,
    Completed,
    Archived,
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Proposed => write!(f, "proposed"),
            NodeStatus::Active => write!(f, "active"),
            NodeStatus::InProgress => write!(f, "in_progress"),
            NodeStatus::Blocked => write!(f, "blocked"),
            NodeStatus::Completed => write!(f, "completed"),
            NodeStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for NodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "proposed" => Ok(NodeStatus::Proposed),
            "active" => Ok(NodeStatus::Active),
            "in_progress" => Ok(NodeStatus::InProgress),
            "blocked" => Ok(NodeStatus::Blocked),
            "completed" => Ok(NodeStatus::Completed),
            "archived" => Ok(NodeStatus::Archived),
            other => Err(format!("unknown node status: {}", other)),
        }
    }
}

/// Kind of relationship an edge expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Source depends on target; maintains dependency/dependent lists
    Dependency,
    Blocks,
    RelatesTo,
    Contains,
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeType::Dependency => write!(f, "dependency"),
            EdgeType::Blocks => write!(f, "blocks"),
            EdgeType::RelatesTo => write!(f, "relates_to"),
            EdgeType::Contains => write!(f, "contains"),
        }
    }
}

impl std::str::FromStr for EdgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "dependency" => Ok(EdgeType::Dependency),
            "blocks" => Ok(EdgeType::Blocks),
            "relates_to" => Ok(EdgeType::RelatesTo),
            "contains" => Ok(EdgeType::Contains),
            other => Err(format!("unknown edge type: {}", other)),
        }
    }
}

/// Placement of a node on the priority sphere
///
/// `radius` in [0, 1] shrinks as priority grows, `theta` is the azimuth in
/// [0, 2π) and `phi` the polar angle in [0, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphericalCoordinate {
    pub radius: f64,
    pub theta: f64,
    pub phi: f64,
}

impl SphericalCoordinate {
    pub fn new(radius: f64, theta: f64, phi: f64) -> Self {
        Self { radius, theta, phi }
    }

    /// Project onto cartesian space (physics convention, phi from +z)
    pub fn to_cartesian(&self) -> CartesianCoordinate {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        CartesianCoordinate {
            x: self.radius * sin_phi * cos_theta,
            y: self.radius * sin_phi * sin_theta,
            z: self.radius * cos_phi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
