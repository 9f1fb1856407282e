//! Hazard sampling: turns a [`BuildingGraph`] template into one concrete instance.
//!
//! Every template edge is resolved independently, in template order:
//!
//! 1. Doors (chain and corridor edges) jam with probability `p_blocked`.
//!    A blocked edge keeps multiplier 1.0 and cannot be traversed.
//! 2. An open corridor fills with smoke with probability `p_smoke`
//!    (multiplier `smoke_cost`).
//! 3. A stairwell is congested with probability `p_congested`
//!    (multiplier `stair_cost`). Stairwells never block.
//!
//! The random source is always passed in, so the same seed reproduces the
//! same instance and parallel trials never share generator state.

use crate::building::BuildingGraph;
use crate::constants::{costs, hazards};
use crate::edge::{CostCause, Edge, EdgeId, EdgeKind};
use crate::error::{check_multiplier, check_probability, ConfigError, RescueError, Result};
use crate::node::Node;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-trial hazard probabilities and the cost multipliers they apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardProfile {
    pub p_blocked: f64,
    pub p_smoke: f64,
    pub p_congested: f64,
    /// Multiplier on a smoke-filled corridor.
    pub smoke_cost: f64,
    /// Multiplier on a congested stairwell.
    pub stair_cost: f64,
}

impl Default for HazardProfile {
    fn default() -> Self {
        Self {
            p_blocked: hazards::P_BLOCKED,
            p_smoke: hazards::P_SMOKE,
            p_congested: hazards::P_CONGESTED,
            smoke_cost: costs::SMOKE_COST,
            stair_cost: costs::STAIR_COST,
        }
    }
}

impl HazardProfile {
    /// No uncertainty: nothing blocks, nothing slows down.
    pub fn none() -> Self {
        Self {
            p_blocked: 0.0,
            p_smoke: 0.0,
            p_congested: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_probability("p_blocked", self.p_blocked)?;
        check_probability("p_smoke", self.p_smoke)?;
        check_probability("p_congested", self.p_congested)?;
        check_multiplier("smoke_cost", self.smoke_cost)?;
        check_multiplier("stair_cost", self.stair_cost)?;
        Ok(())
    }
}

/// Sample an instance from `template`.
///
/// With `seed = None` the generator is seeded from OS entropy.
pub fn sample<'a>(
    template: &'a BuildingGraph,
    profile: &HazardProfile,
    seed: Option<u64>,
) -> Result<SampledGraph<'a>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    sample_with_rng(template, profile, &mut rng)
}

/// Sample an instance from `template` drawing from `rng`.
pub fn sample_with_rng<'a>(
    template: &'a BuildingGraph,
    profile: &HazardProfile,
    rng: &mut impl Rng,
) -> Result<SampledGraph<'a>> {
    profile.validate()?;

    let mut edges = Vec::with_capacity(template.edge_count());
    for e in template.edges() {
        edges.push(resolve_edge(e, profile, rng));
    }
    let graph = SampledGraph::from_edges(template, edges);

    log::debug!(
        "sampled instance: {} of {} edges blocked",
        graph.blocked_count(),
        graph.edges().len()
    );
    Ok(graph)
}

fn resolve_edge(template: &Edge, profile: &HazardProfile, rng: &mut impl Rng) -> Edge {
    let mut edge = template.reset();

    if edge.kind().can_block() && rng.gen::<f64>() < profile.p_blocked {
        edge.set_blocked();
        return edge;
    }

    match edge.kind() {
        EdgeKind::Corridor => {
            if rng.gen::<f64>() < profile.p_smoke {
                edge.set_cause(CostCause::Smoke, profile.smoke_cost);
            }
        }
        EdgeKind::Stair => {
            if rng.gen::<f64>() < profile.p_congested {
                edge.set_cause(CostCause::Congestion, profile.stair_cost);
            }
        }
        EdgeKind::Chain => {}
    }
    edge
}

/// One concrete realization of a template.
///
/// Shares the template's rooms and adjacency read-only and owns its own edge
/// data, one entry per template edge in the same order.
#[derive(Debug, Clone)]
pub struct SampledGraph<'a> {
    template: &'a BuildingGraph,
    edges: Vec<Edge>,
}

impl<'a> SampledGraph<'a> {
    pub(crate) fn from_edges(template: &'a BuildingGraph, edges: Vec<Edge>) -> Self {
        debug_assert_eq!(edges.len(), template.edge_count());
        Self { template, edges }
    }

    pub fn template(&self) -> &'a BuildingGraph {
        self.template
    }

    pub fn nodes(&self) -> &'a [Node] {
        self.template.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn contains(&self, node: Node) -> bool {
        self.template.contains(node)
    }

    pub fn index_of(&self, node: Node) -> Option<usize> {
        self.template.index_of(node)
    }

    pub fn incident_edges(&self, node: Node) -> &'a [EdgeId] {
        self.template.incident_edges(node)
    }

    /// Traversable edges out of `node` paired with the room they lead to.
    pub fn open_neighbors(&self, node: Node) -> impl Iterator<Item = (EdgeId, Node)> + '_ {
        self.incident_edges(node).iter().filter_map(move |&id| {
            let e = &self.edges[id];
            if e.is_traversable() {
                e.other(node).map(|n| (id, n))
            } else {
                None
            }
        })
    }

    pub fn blocked_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_blocked()).count()
    }

    pub fn traversable_count(&self) -> usize {
        self.edges.len() - self.blocked_count()
    }

    /// Edges whose cost was inflated by `cause`.
    pub fn count_cause(&self, cause: CostCause) -> usize {
        self.edges
            .iter()
            .filter(|e| e.is_traversable() && e.cause() == cause)
            .count()
    }

    /// Force one edge shut, regardless of its kind.
    pub fn block(&mut self, id: EdgeId) -> Result<()> {
        match self.edges.get_mut(id) {
            Some(edge) => {
                edge.set_blocked();
                Ok(())
            }
            None => Err(RescueError::InvalidState(format!(
                "edge {} does not exist ({} edges)",
                id,
                self.edges.len()
            ))),
        }
    }

    /// Force every edge touching `node` shut, cutting it off from the building.
    pub fn block_all_incident(&mut self, node: Node) -> Result<()> {
        if !self.contains(node) {
            return Err(RescueError::NodeNotFound(node));
        }
        for &id in self.template.incident_edges(node) {
            self.edges[id].set_blocked();
        }
        Ok(())
    }
}
