//! Undirected, weighted connections between rooms.

use crate::error::{RescueError, Result};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Index of an edge inside its graph's edge vector.
pub type EdgeId = usize;

/// Which construction rule produced an edge. Decides hazard eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Door between consecutive odd or consecutive even rooms.
    Chain,
    /// Same-floor corridor link. Can fill with smoke.
    Corridor,
    /// Stairwell between two floors. Can be congested.
    Stair,
}

impl EdgeKind {
    /// Doors can jam shut; stairwells stay open.
    pub fn can_block(self) -> bool {
        matches!(self, EdgeKind::Chain | EdgeKind::Corridor)
    }
}

/// What inflated an edge's cost in a sampled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CostCause {
    #[default]
    None,
    Smoke,
    Congestion,
}

/// A connection between two distinct rooms. Traversal cost is the same both ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    a: Node,
    b: Node,
    kind: EdgeKind,
    base_cost: f64,
    blocked: bool,
    cause: CostCause,
    cost_multiplier: f64,
}

impl Edge {
    /// An open, unaffected edge.
    pub(crate) fn open(a: Node, b: Node, kind: EdgeKind, base_cost: f64) -> Self {
        debug_assert!(a != b, "self-loop at {a}");
        Self {
            a,
            b,
            kind,
            base_cost,
            blocked: false,
            cause: CostCause::None,
            cost_multiplier: 1.0,
        }
    }

    /// Copy of this edge with its hazards cleared.
    pub(crate) fn reset(&self) -> Self {
        Self::open(self.a, self.b, self.kind, self.base_cost)
    }

    pub(crate) fn set_blocked(&mut self) {
        self.blocked = true;
        self.cause = CostCause::None;
        self.cost_multiplier = 1.0;
    }

    pub(crate) fn set_cause(&mut self, cause: CostCause, multiplier: f64) {
        self.cause = cause;
        self.cost_multiplier = match cause {
            CostCause::None => 1.0,
            CostCause::Smoke | CostCause::Congestion => multiplier,
        };
    }

    pub fn endpoints(&self) -> (Node, Node) {
        (self.a, self.b)
    }

    /// The endpoint opposite `node`, or `None` if `node` is not on this edge.
    pub fn other(&self, node: Node) -> Option<Node> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether this edge joins `x` and `y`, in either direction.
    pub fn connects(&self, x: Node, y: Node) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn base_cost(&self) -> f64 {
        self.base_cost
    }

    pub fn cause(&self) -> CostCause {
        self.cause
    }

    pub fn cost_multiplier(&self) -> f64 {
        self.cost_multiplier
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_traversable(&self) -> bool {
        !self.blocked
    }

    /// `base_cost * cost_multiplier`.
    ///
    /// Asking for the cost of a blocked edge is a caller bug and returns
    /// [`RescueError::InvalidState`].
    pub fn effective_cost(&self) -> Result<f64> {
        if self.blocked {
            return Err(RescueError::InvalidState(format!(
                "cost requested for blocked edge {}<->{}",
                self.a, self.b
            )));
        }
        Ok(self.base_cost * self.cost_multiplier)
    }
}
