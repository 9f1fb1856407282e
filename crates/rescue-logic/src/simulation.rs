//! Trial batches: sample, search with both algorithms, summarize.
//!
//! Trial `i` of a seeded batch samples with `seed + i`, so any single trial
//! can be replayed on its own. Unseeded batches draw every trial seed once, up
//! front, which keeps the sequential and parallel runners interchangeable.

use crate::building::BuildingGraph;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::node::Node;
use crate::sampling::{sample, SampledGraph};
use crate::search::{search, Algorithm, SearchResult};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Both searches run against the same sampled instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// One-based trial number.
    pub trial: u32,
    pub seed: u64,
    pub blocked_edges: usize,
    pub bfs: SearchResult,
    pub dijkstra: SearchResult,
}

impl TrialOutcome {
    pub fn result(&self, algorithm: Algorithm) -> &SearchResult {
        match algorithm {
            Algorithm::Bfs => &self.bfs,
            Algorithm::Dijkstra => &self.dijkstra,
        }
    }
}

/// One sampling seed per trial.
pub fn trial_seeds(config: &SimulationConfig) -> Vec<u64> {
    match config.seed {
        Some(seed) => (0..config.trials)
            .map(|i| seed.wrapping_add(u64::from(i)))
            .collect(),
        None => {
            let mut rng = rand::thread_rng();
            (0..config.trials).map(|_| rng.gen()).collect()
        }
    }
}

/// Sample one instance and search it with both algorithms.
pub fn run_trial(
    template: &BuildingGraph,
    config: &SimulationConfig,
    trial: u32,
    seed: u64,
) -> Result<TrialOutcome> {
    let graph = sample(template, &config.hazard_profile(), Some(seed))?;
    let (start, goal) = (config.start(), config.goal());
    let bfs = search(&graph, start, goal, Algorithm::Bfs)?;
    let dijkstra = search(&graph, start, goal, Algorithm::Dijkstra)?;

    if !dijkstra.success {
        log::warn!("trial {} (seed {}): {} unreachable from {}", trial, seed, goal, start);
    }

    Ok(TrialOutcome {
        trial,
        seed,
        blocked_edges: graph.blocked_count(),
        bfs,
        dijkstra,
    })
}

/// Run every trial of the batch on the current thread.
pub fn run_trials(config: &SimulationConfig) -> Result<Vec<TrialOutcome>> {
    let template = config.build_template()?;
    let seeds = trial_seeds(config);
    log::info!(
        "running {} trials on a {}x{} building",
        seeds.len(),
        config.num_floors,
        config.rooms_per_floor
    );

    seeds
        .iter()
        .zip(1..)
        .map(|(&seed, trial)| run_trial(&template, config, trial, seed))
        .collect()
}

/// Run the batch across the rayon pool. Same outcomes as [`run_trials`],
/// apart from timings.
pub fn run_trials_parallel(config: &SimulationConfig) -> Result<Vec<TrialOutcome>> {
    let template = config.build_template()?;
    let seeds = trial_seeds(config);
    log::info!(
        "running {} trials in parallel on a {}x{} building",
        seeds.len(),
        config.num_floors,
        config.rooms_per_floor
    );

    seeds
        .par_iter()
        .enumerate()
        .map(|(i, &seed)| run_trial(&template, config, i as u32 + 1, seed))
        .collect()
}

/// Recompute the cost of walking `path` on `graph`, taking the cheapest open
/// edge for each hop. `None` if some hop has no open edge.
pub fn path_cost(graph: &SampledGraph<'_>, path: &[Node]) -> Option<f64> {
    let mut total = 0.0;
    for hop in path.windows(2) {
        let (from, to) = (hop[0], hop[1]);
        let cheapest = graph
            .open_neighbors(from)
            .filter(|&(_, next)| next == to)
            .filter_map(|(id, _)| graph.edges()[id].effective_cost().ok())
            .min_by(f64::total_cmp)?;
        total += cheapest;
    }
    Some(total)
}

/// Aggregate figures for one algorithm over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub runs: usize,
    pub successes: usize,
    /// Percentage of runs that reached the goal.
    pub success_rate: f64,
    /// Means over successful runs only; `None` if there were none.
    pub mean_cost: Option<f64>,
    pub mean_edges: Option<f64>,
    pub mean_expanded: Option<f64>,
}

impl AlgorithmSummary {
    fn from_results<'r>(algorithm: Algorithm, results: impl Iterator<Item = &'r SearchResult>) -> Self {
        let results: Vec<&SearchResult> = results.collect();
        let runs = results.len();
        let ok: Vec<&SearchResult> = results.into_iter().filter(|r| r.success).collect();
        let success_rate = if runs == 0 {
            0.0
        } else {
            100.0 * ok.len() as f64 / runs as f64
        };

        Self {
            algorithm,
            runs,
            successes: ok.len(),
            success_rate,
            mean_cost: mean(ok.iter().map(|r| r.total_cost)),
            mean_edges: mean(ok.iter().map(|r| r.edge_count() as f64)),
            mean_expanded: mean(ok.iter().map(|r| r.steps_expanded as f64)),
        }
    }
}

/// BFS against Dijkstra over a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trials: usize,
    pub bfs: AlgorithmSummary,
    pub dijkstra: AlgorithmSummary,
    /// Trials where both succeeded and Dijkstra found a strictly cheaper path.
    pub dijkstra_cheaper: usize,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[TrialOutcome]) -> Self {
        let dijkstra_cheaper = outcomes
            .iter()
            .filter(|o| o.bfs.success && o.dijkstra.success)
            .filter(|o| o.dijkstra.total_cost < o.bfs.total_cost)
            .count();

        Self {
            trials: outcomes.len(),
            bfs: AlgorithmSummary::from_results(Algorithm::Bfs, outcomes.iter().map(|o| &o.bfs)),
            dijkstra: AlgorithmSummary::from_results(
                Algorithm::Dijkstra,
                outcomes.iter().map(|o| &o.dijkstra),
            ),
            dijkstra_cheaper,
        }
    }

    pub fn for_algorithm(&self, algorithm: Algorithm) -> &AlgorithmSummary {
        match algorithm {
            Algorithm::Bfs => &self.bfs,
            Algorithm::Dijkstra => &self.dijkstra,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::build_template;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            num_floors: 4,
            rooms_per_floor: 8,
            trials: 12,
            ..SimulationConfig::default()
        }
    }

    /// Outcome fields that do not depend on timing.
    fn fingerprint(o: &TrialOutcome) -> (u64, Vec<Node>, f64, usize, Vec<Node>, f64, usize) {
        (
            o.seed,
            o.bfs.path.clone(),
            o.bfs.total_cost,
            o.bfs.steps_expanded,
            o.dijkstra.path.clone(),
            o.dijkstra.total_cost,
            o.dijkstra.steps_expanded,
        )
    }

    #[test]
    fn test_seeds_are_consecutive() {
        let config = SimulationConfig {
            seed: Some(u64::MAX),
            trials: 3,
            ..SimulationConfig::default()
        };
        assert_eq!(trial_seeds(&config), vec![u64::MAX, 0, 1]);
    }

    #[test]
    fn test_unseeded_batch_has_one_seed_per_trial() {
        let config = SimulationConfig {
            seed: None,
            trials: 5,
            ..SimulationConfig::default()
        };
        assert_eq!(trial_seeds(&config).len(), 5);
    }

    #[test]
    fn test_batch_numbering() {
        let outcomes = run_trials(&small_config()).unwrap();
        assert_eq!(outcomes.len(), 12);
        assert_eq!(outcomes[0].trial, 1);
        assert_eq!(outcomes[11].trial, 12);
        assert_eq!(outcomes[3].seed, 45);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = small_config();
        let a = run_trials(&config).unwrap();
        let b = run_trials_parallel(&config).unwrap();
        let fa: Vec<_> = a.iter().map(fingerprint).collect();
        let fb: Vec<_> = b.iter().map(fingerprint).collect();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_trial_replays_from_seed() {
        let config = small_config();
        let outcomes = run_trials(&config).unwrap();
        let template = config.build_template().unwrap();
        let replay = run_trial(&template, &config, 7, outcomes[6].seed).unwrap();
        assert_eq!(fingerprint(&replay), fingerprint(&outcomes[6]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            p_blocked: -1.0,
            ..small_config()
        };
        assert!(run_trials(&config).is_err());
        assert!(run_trials_parallel(&config).is_err());
    }

    #[test]
    fn test_path_cost() {
        let t = build_template(1, 6).unwrap();
        let mut g = t.unperturbed();
        let path = [Node::new(0, 1), Node::new(0, 3), Node::new(0, 6)];
        assert_eq!(path_cost(&g, &path), Some(2.0));
        assert_eq!(path_cost(&g, &path[..1]), Some(0.0));
        assert_eq!(path_cost(&g, &[]), Some(0.0));

        g.block_all_incident(Node::new(0, 6)).unwrap();
        assert_eq!(path_cost(&g, &path), None);
    }

    #[test]
    fn test_path_cost_takes_cheapest_parallel_edge() {
        let t = build_template(1, 4).unwrap();
        let mut g = t.unperturbed();
        // 1<->3 has a chain door and a corridor; shutting either leaves the other
        let door = t
            .edges()
            .iter()
            .position(|e| e.connects(Node::new(0, 1), Node::new(0, 3)))
            .unwrap();
        g.block(door).unwrap();
        assert_eq!(path_cost(&g, &[Node::new(0, 1), Node::new(0, 3)]), Some(1.0));
    }

    #[test]
    fn test_summary() {
        let outcomes = run_trials(&small_config()).unwrap();
        let summary = Summary::from_outcomes(&outcomes);
        assert_eq!(summary.trials, 12);
        assert_eq!(summary.bfs.runs, 12);
        // BFS and Dijkstra explore the same instance, so reachability agrees
        assert_eq!(summary.bfs.successes, summary.dijkstra.successes);
        if let (Some(b), Some(d)) = (summary.bfs.mean_cost, summary.dijkstra.mean_cost) {
            assert!(d <= b + 1e-9);
        }
        assert!((0.0..=100.0).contains(&summary.dijkstra.success_rate));
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::from_outcomes(&[]);
        assert_eq!(summary.bfs.success_rate, 0.0);
        assert_eq!(summary.dijkstra.mean_cost, None);
        assert_eq!(summary.dijkstra_cheaper, 0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean([1.0, 2.0, 3.0].into_iter()), Some(2.0));
        assert_eq!(mean(std::iter::empty()), None);
    }
}
