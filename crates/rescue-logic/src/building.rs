//! Fixed building topology, used as the template every trial samples from.
//!
//! Rooms are stored in an arena indexed by `floor * rooms_per_floor + room - 1`.
//! Edges live in one vector and each room keeps a list of incident edge ids,
//! so a sampled instance can reuse the adjacency and only swap the edge data.
//!
//! Edges are generated floor by floor from four rules:
//!
//! | Rule | Pairs | Kind |
//! |------|-------|------|
//! | even chain | 2↔4, 4↔6, … | [`EdgeKind::Chain`] |
//! | odd chain | 1↔3, 3↔5, … | [`EdgeKind::Chain`] |
//! | corridor | every pair on the floor | [`EdgeKind::Corridor`] |
//! | stairs | room 6 on floor k ↔ room 6 on floor k+1 | [`EdgeKind::Stair`] |

use crate::constants::{building::STAIR_ROOM, costs::FREE_COST};
use crate::edge::{Edge, EdgeId, EdgeKind};
use crate::error::{check_cost, ConfigError, Result};
use crate::node::Node;
use crate::sampling::SampledGraph;
use std::collections::BTreeMap;

/// Build the template for a `num_floors` x `rooms_per_floor` building.
pub fn build_template(num_floors: u32, rooms_per_floor: u32) -> Result<BuildingGraph> {
    BuildingGraph::new(num_floors, rooms_per_floor)
}

/// Immutable building template.
#[derive(Debug, Clone)]
pub struct BuildingGraph {
    num_floors: u32,
    rooms_per_floor: u32,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// node index → incident edge ids, in edge creation order
    adj: Vec<Vec<EdgeId>>,
}

impl BuildingGraph {
    /// Build a template whose edges all cost [`FREE_COST`].
    pub fn new(num_floors: u32, rooms_per_floor: u32) -> Result<Self> {
        Self::with_base_cost(num_floors, rooms_per_floor, FREE_COST)
    }

    /// Build a template with an explicit base cost for every edge.
    pub fn with_base_cost(num_floors: u32, rooms_per_floor: u32, base_cost: f64) -> Result<Self> {
        if num_floors < 1 {
            return Err(ConfigError::NoFloors(num_floors).into());
        }
        if rooms_per_floor < 2 {
            return Err(ConfigError::TooFewRooms(rooms_per_floor).into());
        }
        check_cost("free_cost", base_cost)?;

        let nodes: Vec<Node> = (0..num_floors)
            .flat_map(|floor| (1..=rooms_per_floor).map(move |room| Node::new(floor, room)))
            .collect();
        let mut graph = Self {
            num_floors,
            rooms_per_floor,
            adj: vec![Vec::new(); nodes.len()],
            nodes,
            edges: Vec::new(),
        };
        graph.build_edges(base_cost);

        log::debug!(
            "built {}x{} template: {} rooms, {} edges",
            num_floors,
            rooms_per_floor,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn build_edges(&mut self, base_cost: f64) {
        let rooms = self.rooms_per_floor;

        // Chains: even first, then odd
        for first in [2, 1] {
            for floor in 0..self.num_floors {
                for s in (first..=rooms).step_by(2) {
                    if s + 2 <= rooms {
                        self.add_edge(
                            Node::new(floor, s),
                            Node::new(floor, s + 2),
                            EdgeKind::Chain,
                            base_cost,
                        );
                    }
                }
            }
        }

        for floor in 0..self.num_floors {
            for i in 1..=rooms {
                for j in (i + 1)..=rooms {
                    self.add_edge(
                        Node::new(floor, i),
                        Node::new(floor, j),
                        EdgeKind::Corridor,
                        base_cost,
                    );
                }
            }
        }

        // No stairwell in buildings too narrow to have the stair room
        if rooms >= STAIR_ROOM {
            for floor in 1..self.num_floors {
                self.add_edge(
                    Node::new(floor - 1, STAIR_ROOM),
                    Node::new(floor, STAIR_ROOM),
                    EdgeKind::Stair,
                    base_cost,
                );
            }
        }
    }

    fn add_edge(&mut self, a: Node, b: Node, kind: EdgeKind, base_cost: f64) {
        let id = self.edges.len();
        self.edges.push(Edge::open(a, b, kind, base_cost));
        // Both endpoints are generated inside the building
        let (ia, ib) = (self.slot(a), self.slot(b));
        self.adj[ia].push(id);
        self.adj[ib].push(id);
    }

    fn slot(&self, node: Node) -> usize {
        (node.floor() * self.rooms_per_floor + node.room() - 1) as usize
    }

    pub fn num_floors(&self) -> u32 {
        self.num_floors
    }

    pub fn rooms_per_floor(&self) -> u32 {
        self.rooms_per_floor
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `node` is a room of this building.
    pub fn contains(&self, node: Node) -> bool {
        node.floor() < self.num_floors && (1..=self.rooms_per_floor).contains(&node.room())
    }

    /// Stable arena index of `node`. Index order matches `Node` order.
    pub fn index_of(&self, node: Node) -> Option<usize> {
        self.contains(node).then(|| self.slot(node))
    }

    /// Ids of every edge touching `node`. Empty for unknown rooms.
    pub fn incident_edges(&self, node: Node) -> &[EdgeId] {
        self.index_of(node)
            .map(|i| self.adj[i].as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, node: Node) -> usize {
        self.incident_edges(node).len()
    }

    /// Rooms adjacent to `node`, one entry per edge (parallel edges repeat).
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.incident_edges(node)
            .iter()
            .filter_map(move |&id| self.edges[id].other(node))
    }

    /// Number of edges generated by each rule.
    pub fn kind_counts(&self) -> BTreeMap<EdgeKind, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.edges {
            *counts.entry(e.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// An instance with no hazards applied: nothing blocked, every multiplier 1.0.
    pub fn unperturbed(&self) -> SampledGraph<'_> {
        SampledGraph::from_edges(self, self.edges.iter().map(Edge::reset).collect())
    }
}
