//! Rescue-path search over a sampled building.
//!
//! Two strategies behind one entry point:
//!
//! - [`Algorithm::Bfs`] ignores costs when ordering the frontier, so it finds
//!   the path with the fewest hops. Its reported cost is the sum of the
//!   effective costs of the edges it actually walked.
//! - [`Algorithm::Dijkstra`] orders the frontier by accumulated effective cost
//!   and returns the cheapest path. Equal costs pop the smaller
//!   `(floor, room)` first.
//!
//! Blocked edges are never followed by either. An unreachable goal is a normal
//! outcome (`success == false`, empty path), not an error.

use crate::edge::EdgeId;
use crate::error::{RescueError, Result};
use crate::node::Node;
use crate::sampling::SampledGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

/// Search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Bfs,
    Dijkstra,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Bfs, Algorithm::Dijkstra];
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Bfs => f.write_str("BFS"),
            Algorithm::Dijkstra => f.write_str("Dijkstra"),
        }
    }
}

/// Outcome of one search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub algorithm: Algorithm,
    /// Rooms from start to goal inclusive. Empty when no path exists.
    pub path: Vec<Node>,
    pub total_cost: f64,
    /// Rooms taken off the frontier and expanded.
    pub steps_expanded: usize,
    /// Wall-clock time spent inside the search, sampling excluded.
    pub elapsed: Duration,
    pub success: bool,
}

impl SearchResult {
    /// Number of hops on the path.
    pub fn edge_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Find a path from `start` to `goal` with the chosen strategy.
pub fn search(
    graph: &SampledGraph<'_>,
    start: Node,
    goal: Node,
    algorithm: Algorithm,
) -> Result<SearchResult> {
    for node in [start, goal] {
        if !graph.contains(node) {
            return Err(RescueError::NodeNotFound(node));
        }
    }

    let timer = Instant::now();
    let walk = match algorithm {
        Algorithm::Bfs => bfs_walk(graph, start, goal)?,
        Algorithm::Dijkstra => dijkstra_walk(graph, start, goal)?,
    };
    let elapsed = timer.elapsed();

    let (path, total_cost, success) = match walk.route {
        Some((path, cost)) => (path, cost, true),
        None => (Vec::new(), 0.0, false),
    };
    log::debug!(
        "{} {} -> {}: success={} cost={} expanded={}",
        algorithm,
        start,
        goal,
        success,
        total_cost,
        walk.steps
    );

    Ok(SearchResult {
        algorithm,
        path,
        total_cost,
        steps_expanded: walk.steps,
        elapsed,
        success,
    })
}

/// Breadth-first search. See [`search`].
pub fn bfs(graph: &SampledGraph<'_>, start: Node, goal: Node) -> Result<SearchResult> {
    search(graph, start, goal, Algorithm::Bfs)
}

/// Dijkstra search. See [`search`].
pub fn dijkstra(graph: &SampledGraph<'_>, start: Node, goal: Node) -> Result<SearchResult> {
    search(graph, start, goal, Algorithm::Dijkstra)
}

/// Raw search output before timing and packaging.
struct Walk {
    route: Option<(Vec<Node>, f64)>,
    steps: usize,
}

/// slot → (predecessor slot, edge used to reach this slot)
type Predecessors = Vec<Option<(usize, EdgeId)>>;

fn slot_of(graph: &SampledGraph<'_>, node: Node) -> Result<usize> {
    graph
        .index_of(node)
        .ok_or_else(|| RescueError::InvalidState(format!("edge endpoint {} outside graph", node)))
}

/// Walk predecessor links back from `goal` and return the rooms and edges
/// in start-to-goal order.
fn unwind(
    graph: &SampledGraph<'_>,
    pred: &Predecessors,
    goal_slot: usize,
) -> (Vec<Node>, Vec<EdgeId>) {
    let nodes = graph.nodes();
    let mut path = vec![nodes[goal_slot]];
    let mut edges = Vec::new();
    let mut current = goal_slot;
    while let Some((prev, edge)) = pred[current] {
        path.push(nodes[prev]);
        edges.push(edge);
        current = prev;
    }
    path.reverse();
    edges.reverse();
    (path, edges)
}

fn bfs_walk(graph: &SampledGraph<'_>, start: Node, goal: Node) -> Result<Walk> {
    let n = graph.nodes().len();
    let mut discovered = vec![false; n];
    let mut pred: Predecessors = vec![None; n];
    let mut queue = VecDeque::new();
    let mut steps = 0;

    discovered[slot_of(graph, start)?] = true;
    queue.push_back(start);

    // Rooms are queued only on first discovery, so each is expanded once
    while let Some(current) = queue.pop_front() {
        steps += 1;
        let current_slot = slot_of(graph, current)?;
        if current == goal {
            let (path, edges) = unwind(graph, &pred, current_slot);
            let mut cost = 0.0;
            for id in edges {
                cost += graph.edges()[id].effective_cost()?;
            }
            return Ok(Walk {
                route: Some((path, cost)),
                steps,
            });
        }

        for (edge, next) in graph.open_neighbors(current) {
            let next_slot = slot_of(graph, next)?;
            if !discovered[next_slot] {
                discovered[next_slot] = true;
                pred[next_slot] = Some((current_slot, edge));
                queue.push_back(next);
            }
        }
    }

    Ok(Walk { route: None, steps })
}

/// Frontier entry. Ordered so the max-heap pops the lowest cost, then the
/// smallest room.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: Node,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

fn dijkstra_walk(graph: &SampledGraph<'_>, start: Node, goal: Node) -> Result<Walk> {
    let n = graph.nodes().len();
    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut pred: Predecessors = vec![None; n];
    let mut heap = BinaryHeap::new();
    let mut steps = 0;

    dist[slot_of(graph, start)?] = 0.0;
    heap.push(Frontier {
        cost: 0.0,
        node: start,
    });

    while let Some(Frontier { cost, node }) = heap.pop() {
        let slot = slot_of(graph, node)?;
        if settled[slot] {
            continue;
        }
        settled[slot] = true;
        steps += 1;

        if node == goal {
            let (path, _) = unwind(graph, &pred, slot);
            return Ok(Walk {
                route: Some((path, cost)),
                steps,
            });
        }

        for (edge, next) in graph.open_neighbors(node) {
            let next_slot = slot_of(graph, next)?;
            if settled[next_slot] {
                continue;
            }
            let candidate = cost + graph.edges()[edge].effective_cost()?;
            if candidate < dist[next_slot] {
                dist[next_slot] = candidate;
                pred[next_slot] = Some((slot, edge));
                heap.push(Frontier {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    Ok(Walk { route: None, steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::build_template;
    use crate::edge::EdgeKind;
    use crate::sampling::{sample, HazardProfile};

    /// Smoke every corridor so the chain doors become the cheap route.
    fn smoky() -> HazardProfile {
        HazardProfile {
            p_blocked: 0.0,
            p_smoke: 1.0,
            p_congested: 0.0,
            smoke_cost: 5.0,
            stair_cost: 2.0,
        }
    }

    #[test]
    fn test_same_room() {
        let t = build_template(2, 6).unwrap();
        let g = t.unperturbed();
        for algorithm in Algorithm::ALL {
            let r = search(&g, Node::new(1, 3), Node::new(1, 3), algorithm).unwrap();
            assert!(r.success);
            assert_eq!(r.path, vec![Node::new(1, 3)]);
            assert_eq!(r.total_cost, 0.0);
            assert_eq!(r.steps_expanded, 1);
        }
    }

    #[test]
    fn test_unknown_node() {
        let t = build_template(2, 6).unwrap();
        let g = t.unperturbed();
        let err = search(&g, Node::new(0, 1), Node::new(2, 1), Algorithm::Bfs).unwrap_err();
        assert_eq!(err, RescueError::NodeNotFound(Node::new(2, 1)));
        let err = search(&g, Node::new(0, 0), Node::new(0, 1), Algorithm::Dijkstra).unwrap_err();
        assert_eq!(err, RescueError::NodeNotFound(Node::new(0, 0)));
    }

    #[test]
    fn test_same_floor_single_hop() {
        let t = build_template(1, 12).unwrap();
        let g = t.unperturbed();
        for algorithm in Algorithm::ALL {
            let r = search(&g, Node::new(0, 1), Node::new(0, 12), algorithm).unwrap();
            assert_eq!(r.path, vec![Node::new(0, 1), Node::new(0, 12)]);
            assert_eq!(r.total_cost, 1.0);
        }
    }

    #[test]
    fn test_cross_floor_via_stairs() {
        let t = build_template(3, 12).unwrap();
        let g = t.unperturbed();
        let r = bfs(&g, Node::new(0, 1), Node::new(2, 12)).unwrap();
        // 1 -> 6, up two flights, 6 -> 12
        assert_eq!(r.edge_count(), 4);
        assert_eq!(
            r.path,
            vec![
                Node::new(0, 1),
                Node::new(0, 6),
                Node::new(1, 6),
                Node::new(2, 6),
                Node::new(2, 12)
            ]
        );
        let d = dijkstra(&g, Node::new(0, 1), Node::new(2, 12)).unwrap();
        assert_eq!(d.total_cost, 4.0);
    }

    #[test]
    fn test_dijkstra_avoids_smoke() {
        let t = build_template(1, 12).unwrap();
        let g = sample(&t, &smoky(), Some(1)).unwrap();
        let b = bfs(&g, Node::new(0, 1), Node::new(0, 7)).unwrap();
        let d = dijkstra(&g, Node::new(0, 1), Node::new(0, 7)).unwrap();
        // Room 7 is one smoky corridor hop from room 1
        assert_eq!(b.edge_count(), 1);
        assert_eq!(b.total_cost, 5.0);
        // Dijkstra walks the odd doors 1-3-5-7 for 3.0
        assert_eq!(
            d.path,
            vec![Node::new(0, 1), Node::new(0, 3), Node::new(0, 5), Node::new(0, 7)]
        );
        assert_eq!(d.total_cost, 3.0);
        assert!(d.total_cost <= b.total_cost);
    }

    #[test]
    fn test_bfs_prefers_chain_door_when_listed_first() {
        let t = build_template(1, 12).unwrap();
        let g = sample(&t, &smoky(), Some(1)).unwrap();
        // 1->3 exists as both a chain door and a smoky corridor; the door is
        // created first, so BFS reaches 3 through it
        let r = bfs(&g, Node::new(0, 1), Node::new(0, 3)).unwrap();
        assert_eq!(r.total_cost, 1.0);
    }

    #[test]
    fn test_isolated_goal() {
        let t = build_template(3, 12).unwrap();
        let mut g = t.unperturbed();
        let goal = Node::new(2, 12);
        g.block_all_incident(goal).unwrap();
        for algorithm in Algorithm::ALL {
            let r = search(&g, Node::new(0, 1), goal, algorithm).unwrap();
            assert!(!r.success);
            assert!(r.path.is_empty());
            assert_eq!(r.total_cost, 0.0);
            // everything except the goal got expanded
            assert_eq!(r.steps_expanded, t.node_count() - 1);
        }
    }

    #[test]
    fn test_blocked_stair_cuts_floors() {
        let t = build_template(2, 6).unwrap();
        let mut g = t.unperturbed();
        let stair = t
            .edges()
            .iter()
            .position(|e| e.kind() == EdgeKind::Stair)
            .unwrap();
        g.block(stair).unwrap();
        let r = dijkstra(&g, Node::new(0, 1), Node::new(1, 1)).unwrap();
        assert!(!r.success);
    }

    #[test]
    fn test_dijkstra_tie_break_is_deterministic() {
        let t = build_template(1, 4).unwrap();
        let g = t.unperturbed();
        // Rooms 2, 3 and 4 all sit at cost 1 and pop in room order
        let r = dijkstra(&g, Node::new(0, 1), Node::new(0, 4)).unwrap();
        assert_eq!(r.path, vec![Node::new(0, 1), Node::new(0, 4)]);
        assert_eq!(r.steps_expanded, 4);
        let again = dijkstra(&g, Node::new(0, 1), Node::new(0, 4)).unwrap();
        assert_eq!(again.path, r.path);
        assert_eq!(again.steps_expanded, r.steps_expanded);
    }

    #[test]
    fn test_frontier_order() {
        let mut heap = BinaryHeap::new();
        heap.push(Frontier {
            cost: 2.0,
            node: Node::new(0, 1),
        });
        heap.push(Frontier {
            cost: 1.0,
            node: Node::new(0, 9),
        });
        heap.push(Frontier {
            cost: 1.0,
            node: Node::new(0, 3),
        });
        let order: Vec<Node> = std::iter::from_fn(|| heap.pop().map(|f| f.node)).collect();
        assert_eq!(order, vec![Node::new(0, 3), Node::new(0, 9), Node::new(0, 1)]);
    }

    #[test]
    fn test_result_serializes() {
        let t = build_template(1, 3).unwrap();
        let g = t.unperturbed();
        let r = bfs(&g, Node::new(0, 1), Node::new(0, 2)).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, r.path);
        assert_eq!(back.algorithm, Algorithm::Bfs);
    }
}
