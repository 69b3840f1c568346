//! Democratic priority scoring
//!
//! A node's priority blends three inputs, each nominally in [0, 1]:
//! executive direction, the individual owner's view, and community votes.
//! The composite `computed` score drives the node's distance from the
//! center of the priority sphere.

use serde::{Deserialize, Serialize};

/// Weight of the executive input in the composite score
pub const EXECUTIVE_WEIGHT: f64 = 0.4;
/// Weight of the individual input in the composite score
pub const INDIVIDUAL_WEIGHT: f64 = 0.3;
/// Weight of the community input in the composite score
pub const COMMUNITY_WEIGHT: f64 = 0.3;

/// Raw priority inputs plus the derived composite score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Priority {
    pub executive: f64,
    pub individual: f64,
    pub community: f64,
    /// Always derived from the other three; never set by callers
    pub computed: f64,
}

/// Partial priority change; `None` keeps the current value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub executive: Option<f64>,
    pub individual: Option<f64>,
    pub community: Option<f64>,
}

impl PriorityUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executive(mut self, value: f64) -> Self {
        self.executive = Some(value);
        self
    }

    pub fn individual(mut self, value: f64) -> Self {
        self.individual = Some(value);
        self
    }

    pub fn community(mut self, value: f64) -> Self {
        self.community = Some(value);
        self
    }
}

/// Stateless priority arithmetic
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityCalculator;

impl PriorityCalculator {
    /// Combine raw inputs into a [`Priority`]
    ///
    /// Inputs are echoed back unchanged; only the weighted sum is clamped.
    pub fn calculate(executive: f64, individual: f64, community: f64) -> Priority {
        let computed = clamp01(
            executive * EXECUTIVE_WEIGHT
                + individual * INDIVIDUAL_WEIGHT
                + community * COMMUNITY_WEIGHT,
        );
        Priority {
            executive,
            individual,
            community,
            computed,
        }
    }

    /// Distance from the sphere center for a computed priority
    ///
    /// Expects `priority` already in [0, 1].
    pub fn radius_from_priority(priority: f64) -> f64 {
        1.0 - priority
    }

    /// Shift the community input by `community_boost * time_factor`
    ///
    /// Executive and individual inputs are left untouched.
    pub fn migrate_priority(current: &Priority, community_boost: f64, time_factor: f64) -> Priority {
        let community = clamp01(current.community + community_boost * time_factor);
        Self::calculate(current.executive, current.individual, community)
    }
}

pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
