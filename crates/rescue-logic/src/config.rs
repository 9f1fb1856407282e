//! Simulation configuration and validation.
//!
//! Everything a trial batch needs lives in [`SimulationConfig`]: building
//! dimensions, the free edge cost, hazard probabilities and multipliers, the
//! random seed, trial count, and the rescue endpoints. Values are validated
//! before any graph is built.
//!
//! ```
//! use rescue_logic::config::SimulationConfig;
//!
//! let config = SimulationConfig::from_json_str(r#"{ "num_floors": 3, "trials": 10 }"#).unwrap();
//! assert_eq!(config.rooms_per_floor, 12);
//! assert!(config.validate().is_empty());
//! ```

use crate::building::BuildingGraph;
use crate::constants::{building, costs, hazards, simulation};
use crate::error::{check_cost, check_multiplier, check_probability, ConfigError, Result};
use crate::node::Node;
use crate::sampling::HazardProfile;
use serde::{Deserialize, Serialize};

/// Inputs for one batch of rescue trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_floors: u32,
    pub rooms_per_floor: u32,
    /// Base cost of every edge.
    pub free_cost: f64,
    /// Multiplier on a smoke-filled corridor.
    pub smoke_cost: f64,
    /// Multiplier on a congested stairwell.
    pub stair_cost: f64,
    pub p_blocked: f64,
    pub p_smoke: f64,
    pub p_congested: f64,
    /// Trial `i` samples with `seed + i`. `None` = fresh entropy per batch.
    pub seed: Option<u64>,
    pub trials: u32,
    /// Entry point (None = floor 0, room 1).
    pub start: Option<Node>,
    /// Victim location (None = top floor, last room).
    pub goal: Option<Node>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_floors: building::NUM_FLOORS,
            rooms_per_floor: building::ROOMS_PER_FLOOR,
            free_cost: costs::FREE_COST,
            smoke_cost: costs::SMOKE_COST,
            stair_cost: costs::STAIR_COST,
            p_blocked: hazards::P_BLOCKED,
            p_smoke: hazards::P_SMOKE,
            p_congested: hazards::P_CONGESTED,
            seed: Some(simulation::SEED),
            trials: simulation::TRIALS,
            start: None,
            goal: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn start(&self) -> Node {
        self.start.unwrap_or(Node::new(0, 1))
    }

    pub fn goal(&self) -> Node {
        self.goal.unwrap_or(Node::new(
            self.num_floors.saturating_sub(1),
            self.rooms_per_floor,
        ))
    }

    pub fn hazard_profile(&self) -> HazardProfile {
        HazardProfile {
            p_blocked: self.p_blocked,
            p_smoke: self.p_smoke,
            p_congested: self.p_congested,
            smoke_cost: self.smoke_cost,
            stair_cost: self.stair_cost,
        }
    }

    /// Validate every field, returning all errors found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.num_floors < 1 {
            errors.push(ConfigError::NoFloors(self.num_floors));
        }
        if self.rooms_per_floor < 2 {
            errors.push(ConfigError::TooFewRooms(self.rooms_per_floor));
        }
        let checks = [
            check_cost("free_cost", self.free_cost),
            check_multiplier("smoke_cost", self.smoke_cost),
            check_multiplier("stair_cost", self.stair_cost),
            check_probability("p_blocked", self.p_blocked),
            check_probability("p_smoke", self.p_smoke),
            check_probability("p_congested", self.p_congested),
        ];
        errors.extend(checks.into_iter().filter_map(|c| c.err()));

        if self.trials == 0 {
            errors.push(ConfigError::ZeroTrials);
        }

        for (role, node) in [("start", self.start()), ("goal", self.goal())] {
            let inside = node.floor() < self.num_floors
                && (1..=self.rooms_per_floor).contains(&node.room());
            if !inside {
                errors.push(ConfigError::EndpointOutsideBuilding {
                    role,
                    node,
                    floors: self.num_floors,
                    rooms: self.rooms_per_floor,
                });
            }
        }

        errors
    }

    /// First validation error, if any.
    pub fn check(&self) -> std::result::Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validate and build the building template this config describes.
    pub fn build_template(&self) -> Result<BuildingGraph> {
        self.check()?;
        BuildingGraph::with_base_cost(self.num_floors, self.rooms_per_floor, self.free_cost)
    }
}
