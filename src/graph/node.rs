//! Node representation: one unit of work in the graph

use super::priority::{Priority, PriorityCalculator, PriorityUpdate};
use super::types::{ContributorId, Metadata, NodeStatus, NodeType, SphericalCoordinate};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use uuid::Uuid;

/// Unique identifier for a node
///
/// Serializes as a plain string. Generated ids are UUID v4, but any unique
/// string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new random NodeId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A unit of work: outcome, task, milestone or idea
///
/// The serialized form is the plain record handed to persistence and
/// transport layers. Deserializing a record restores it verbatim, including
/// the stored `computed` priority and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    position: SphericalCoordinate,
    priority: Priority,
    status: NodeStatus,
    #[serde(default)]
    contributors: Vec<ContributorId>,
    #[serde(default)]
    dependencies: Vec<NodeId>,
    #[serde(default)]
    dependents: Vec<NodeId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

impl Node {
    /// Create a node with default status, zero priority and a random position
    pub fn new(title: impl Into<String>, node_type: NodeType) -> Self {
        Self::builder(title, node_type).build()
    }

    /// Start building a node with the two required fields
    pub fn builder(title: impl Into<String>, node_type: NodeType) -> NodeBuilder {
        NodeBuilder::new(title, node_type)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn position(&self) -> &SphericalCoordinate {
        &self.position
    }

    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    pub fn contributors(&self) -> &[ContributorId] {
        &self.contributors
    }

    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Nodes depending on this one; maintained by the owning graph
    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Merge the given inputs over the current ones and recompute
    ///
    /// Only `position.radius` follows the new score; theta and phi stay put.
    pub fn update_priority(&mut self, update: PriorityUpdate) {
        self.priority = PriorityCalculator::calculate(
            update.executive.unwrap_or(self.priority.executive),
            update.individual.unwrap_or(self.priority.individual),
            update.community.unwrap_or(self.priority.community),
        );
        self.position.radius = PriorityCalculator::radius_from_priority(self.priority.computed);
        self.touch();
    }

    /// Apply a community boost scaled by `time_factor`
    pub fn boost_priority(&mut self, community_boost: f64, time_factor: f64) {
        self.priority =
            PriorityCalculator::migrate_priority(&self.priority, community_boost, time_factor);
        self.position.radius = PriorityCalculator::radius_from_priority(self.priority.computed);
        self.touch();
    }

    /// Draw fresh angles and recompute the radius from the current score
    pub fn recalculate_position(&mut self) {
        self.position = random_position(self.priority.computed);
        self.touch();
    }

    /// Returns `true` if the contributor was not already present
    pub fn add_contributor(&mut self, contributor: impl Into<ContributorId>) -> bool {
        let contributor = contributor.into();
        if self.contributors.contains(&contributor) {
            return false;
        }
        self.contributors.push(contributor);
        self.touch();
        true
    }

    /// Returns `true` if the contributor was present
    pub fn remove_contributor(&mut self, contributor: &ContributorId) -> bool {
        match self.contributors.iter().position(|c| c == contributor) {
            Some(index) => {
                self.contributors.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Record that this node depends on `node_id`
    ///
    /// Low-level primitive: no edge is created and the other node's
    /// dependents are untouched. Use `Graph::add_edge` to keep both sides
    /// consistent.
    pub fn add_dependency(&mut self, node_id: NodeId) -> bool {
        if self.dependencies.contains(&node_id) {
            return false;
        }
        self.dependencies.push(node_id);
        self.touch();
        true
    }

    /// Counterpart of [`Node::add_dependency`]
    pub fn remove_dependency(&mut self, node_id: &NodeId) -> bool {
        match self.dependencies.iter().position(|d| d == node_id) {
            Some(index) => {
                self.dependencies.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Set the status; always bumps `updated_at`, even when unchanged
    pub fn update_status(&mut self, status: NodeStatus) {
        self.status = status;
        self.touch();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
        self.touch();
    }

    /// Raw append used by the graph; duplicates are kept
    pub(crate) fn push_dependent(&mut self, node_id: NodeId) {
        self.dependents.push(node_id);
    }

    /// Remove the first occurrence of `node_id` from the dependents list
    pub(crate) fn remove_first_dependent(&mut self, node_id: &NodeId) -> bool {
        match self.dependents.iter().position(|d| d == node_id) {
            Some(index) => {
                self.dependents.remove(index);
                true
            }
            None => false,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Builder for [`Node`]; unspecified fields take construction defaults
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    id: Option<NodeId>,
    node_type: NodeType,
    title: String,
    description: Option<String>,
    status: NodeStatus,
    executive: f64,
    individual: f64,
    community: f64,
    position: Option<SphericalCoordinate>,
    contributors: Vec<ContributorId>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    metadata: Option<Metadata>,
}

impl NodeBuilder {
    fn new(title: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: None,
            node_type,
            title: title.into(),
            description: None,
            status: NodeStatus::default(),
            executive: 0.0,
            individual: 0.0,
            community: 0.0,
            position: None,
            contributors: Vec::new(),
            created_at: None,
            updated_at: None,
            metadata: None,
        }
    }

    pub fn id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Raw priority inputs; the composite is computed at build time
    pub fn priority(mut self, executive: f64, individual: f64, community: f64) -> Self {
        self.executive = executive;
        self.individual = individual;
        self.community = community;
        self
    }

    /// Explicit position, used as-is instead of deriving one
    pub fn position(mut self, position: SphericalCoordinate) -> Self {
        self.position = Some(position);
        self
    }

    pub fn contributor(mut self, contributor: impl Into<ContributorId>) -> Self {
        let contributor = contributor.into();
        if !self.contributors.contains(&contributor) {
            self.contributors.push(contributor);
        }
        self
    }

    pub fn timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Node {
        let now = Utc::now();
        let priority = PriorityCalculator::calculate(self.executive, self.individual, self.community);
        let position = self
            .position
            .unwrap_or_else(|| random_position(priority.computed));

        Node {
            id: self.id.unwrap_or_default(),
            node_type: self.node_type,
            title: self.title,
            description: self.description,
            position,
            priority,
            status: self.status,
            contributors: self.contributors,
            dependencies: Vec::new(),
            dependents: Vec::new(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
            metadata: self.metadata,
        }
    }
}

/// Uniformly distributed point on the sphere surface at the priority radius
fn random_position(computed: f64) -> SphericalCoordinate {
    let mut rng = rand::thread_rng();
    let theta = rng.gen_range(0.0..TAU);
    let phi = (2.0 * rng.gen::<f64>() - 1.0).acos();
    SphericalCoordinate {
        radius: PriorityCalculator::radius_from_priority(computed),
        theta,
        phi,
    }
}
