//! Error types for building construction, sampling, and search.

use crate::node::Node;
use thiserror::Error;

/// A malformed configuration value, caught at the entry point that received it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("building needs at least one floor, got {0}")]
    NoFloors(u32),
    #[error("each floor needs at least two rooms, got {0}")]
    TooFewRooms(u32),
    #[error("probability `{name}` must be in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("cost `{name}` must be a positive finite number, got {value}")]
    NonPositiveCost { name: &'static str, value: f64 },
    #[error("cost multiplier `{name}` must be at least 1.0, got {value}")]
    MultiplierBelowOne { name: &'static str, value: f64 },
    #[error("simulation needs at least one trial")]
    ZeroTrials,
    #[error("{role} {node} is outside a {floors}x{rooms} building")]
    EndpointOutsideBuilding {
        role: &'static str,
        node: Node,
        floors: u32,
        rooms: u32,
    },
    #[error("invalid configuration JSON: {0}")]
    Json(String),
}

/// Errors surfaced by the rescue core.
///
/// An unreachable goal is not an error: it comes back as a
/// [`SearchResult`](crate::search::SearchResult) with `success == false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RescueError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("node {0} is not part of the graph")]
    NodeNotFound(Node),
    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, RescueError>;

/// Check that `value` is a probability.
pub(crate) fn check_probability(name: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

/// Check that `value` is a usable base cost.
pub(crate) fn check_cost(name: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveCost { name, value })
    }
}

/// Check that `value` is a usable cost multiplier.
pub(crate) fn check_multiplier(name: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::MultiplierBelowOne { name, value })
    }
}
