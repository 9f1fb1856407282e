//! Rescue Simulation Headless Harness
//!
//! Validates the building model and both search algorithms, then runs a
//! batch of trials and compares BFS against Dijkstra.
//! Runs entirely in-process: no files written, no rendering.
//!
//! Usage:
//!   cargo run -p rescue-simtest
//!   cargo run -p rescue-simtest -- --verbose
//!   cargo run -p rescue-simtest -- --config batch.json --trials 500 --parallel --json
//!
//! Log level comes from `RUST_LOG` (default `info`).

use flexi_logger::Logger;
use rescue_logic::building::build_template;
use rescue_logic::config::SimulationConfig;
use rescue_logic::constants::costs::FREE_COST;
use rescue_logic::edge::EdgeKind;
use rescue_logic::node::Node;
use rescue_logic::sampling::{sample, HazardProfile};
use rescue_logic::search::{search, Algorithm};
use rescue_logic::simulation::{path_cost, run_trials, run_trials_parallel, Summary, TrialOutcome};

// ── Command line ────────────────────────────────────────────────────────

struct Args {
    verbose: bool,
    parallel: bool,
    json: bool,
    config_path: Option<String>,
    trials: Option<u32>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        verbose: false,
        parallel: false,
        json: false,
        config_path: None,
        trials: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--parallel" => args.parallel = true,
            "--json" => args.json = true,
            "--config" => {
                args.config_path = Some(it.next().ok_or("--config needs a path")?);
            }
            "--trials" => {
                let n = it.next().ok_or("--trials needs a number")?;
                args.trials = Some(n.parse().map_err(|e| format!("--trials {}: {}", n, e))?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<SimulationConfig, String> {
    let mut config = match &args.config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
            SimulationConfig::from_json_str(&text).map_err(|e| e.to_string())?
        }
        None => SimulationConfig::default(),
    };
    if let Some(trials) = args.trials {
        config.trials = trials;
    }
    Ok(config)
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let _logger = match Logger::try_with_env_or_str("info").and_then(|l| l.start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {}", e);
            None
        }
    };

    println!("=== Rescue Simulation Harness ===\n");

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&config));

    // 2. Template topology
    results.extend(validate_template(args.verbose));

    // 3. Hazard sampling
    results.extend(validate_sampling(args.verbose));

    // 4. Fixed search scenarios
    results.extend(validate_scenarios(args.verbose));

    // 5. Trial batch: BFS vs Dijkstra
    if config.validate().is_empty() {
        results.extend(compare_algorithms(&config, &args));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &SimulationConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let errors = config.validate();
    let detail = if errors.is_empty() {
        format!(
            "{}x{} building, {} trials, seed {:?}, {} → {}",
            config.num_floors,
            config.rooms_per_floor,
            config.trials,
            config.seed,
            config.start(),
            config.goal()
        )
    } else {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    };
    vec![TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail,
    }]
}

// ── 2. Template ─────────────────────────────────────────────────────────

fn validate_template(verbose: bool) -> Vec<TestResult> {
    println!("--- Template ---");
    let mut results = Vec::new();

    let mut isolated = Vec::new();
    let mut size_mismatch = Vec::new();
    for floors in 1..=8 {
        for rooms in 2..=14 {
            let t = match build_template(floors, rooms) {
                Ok(t) => t,
                Err(e) => {
                    size_mismatch.push(format!("{}x{}: {}", floors, rooms, e));
                    continue;
                }
            };
            if t.node_count() != (floors * rooms) as usize {
                size_mismatch.push(format!("{}x{}: {} nodes", floors, rooms, t.node_count()));
            }
            if let Some(n) = t.nodes().iter().find(|&&n| t.degree(n) == 0) {
                isolated.push(format!("{}x{} {}", floors, rooms, n));
            }
        }
    }
    results.push(TestResult {
        name: "template_node_count".into(),
        passed: size_mismatch.is_empty(),
        detail: if size_mismatch.is_empty() {
            "F*R nodes for every size in 1..=8 x 2..=14".into()
        } else {
            size_mismatch.join(", ")
        },
    });
    results.push(TestResult {
        name: "template_no_isolated_rooms".into(),
        passed: isolated.is_empty(),
        detail: if isolated.is_empty() {
            "every room has degree ≥ 1".into()
        } else {
            isolated.join(", ")
        },
    });

    results.push(TestResult {
        name: "template_rejects_bad_dimensions".into(),
        passed: build_template(0, 12).is_err() && build_template(7, 1).is_err(),
        detail: "0 floors or 1 room per floor → InvalidConfig".into(),
    });

    if let Ok(t) = build_template(7, 12) {
        let counts = t.kind_counts();
        if verbose {
            for (kind, count) in &counts {
                println!("    {:?}: {} edges", kind, count);
            }
        }
        results.push(TestResult {
            name: "template_edge_kinds".into(),
            passed: counts.get(&EdgeKind::Chain) == Some(&70)
                && counts.get(&EdgeKind::Corridor) == Some(&462)
                && counts.get(&EdgeKind::Stair) == Some(&6),
            detail: format!("7x12: {:?}", counts),
        });
    }

    results
}

// ── 3. Sampling ─────────────────────────────────────────────────────────

fn validate_sampling(verbose: bool) -> Vec<TestResult> {
    println!("--- Sampling ---");
    let mut results = Vec::new();
    let t = match build_template(7, 12) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "sampling_template".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let profile = HazardProfile::default();

    let mut mismatched = Vec::new();
    for seed in [42, 123, 999] {
        match (sample(&t, &profile, Some(seed)), sample(&t, &profile, Some(seed))) {
            (Ok(a), Ok(b)) => {
                let same = a.edges().iter().zip(b.edges()).all(|(x, y)| {
                    x.is_blocked() == y.is_blocked() && x.cost_multiplier() == y.cost_multiplier()
                });
                if !same {
                    mismatched.push(seed);
                }
                if verbose {
                    println!(
                        "    seed {}: {}/{} edges kept ({:.1}%)",
                        seed,
                        a.traversable_count(),
                        t.edge_count(),
                        100.0 * a.traversable_count() as f64 / t.edge_count() as f64
                    );
                }
            }
            _ => mismatched.push(seed),
        }
    }
    results.push(TestResult {
        name: "sampling_reproducible".into(),
        passed: mismatched.is_empty(),
        detail: format!("same seed → same instance (mismatched seeds: {:?})", mismatched),
    });

    let all_blocked = HazardProfile {
        p_blocked: 1.0,
        ..HazardProfile::none()
    };
    let stairs_open = sample(&t, &all_blocked, Some(42))
        .map(|g| {
            g.edges()
                .iter()
                .all(|e| e.is_blocked() == (e.kind() != EdgeKind::Stair))
        })
        .unwrap_or(false);
    results.push(TestResult {
        name: "sampling_stairs_never_block".into(),
        passed: stairs_open,
        detail: "p_blocked = 1 shuts every door, leaves stairwells".into(),
    });

    let bad = HazardProfile {
        p_congested: 1.5,
        ..HazardProfile::default()
    };
    results.push(TestResult {
        name: "sampling_rejects_bad_probability".into(),
        passed: sample(&t, &bad, Some(1)).is_err(),
        detail: "p_congested = 1.5 → InvalidConfig".into(),
    });

    results
}

// ── 4. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(_verbose: bool) -> Vec<TestResult> {
    println!("--- Search Scenarios ---");
    let mut results = Vec::new();
    let t = match build_template(7, 12) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "scenario_template".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let entry = Node::new(0, 1);
    let victim = Node::new(6, 12);

    // No uncertainty
    if let Ok(g) = sample(&t, &HazardProfile::none(), Some(42)) {
        let bfs = search(&g, entry, victim, Algorithm::Bfs);
        let dij = search(&g, entry, victim, Algorithm::Dijkstra);
        let (passed, detail) = match (bfs, dij) {
            (Ok(b), Ok(d)) => (
                b.success
                    && d.success
                    && d.total_cost == d.edge_count() as f64 * FREE_COST,
                format!(
                    "BFS {} hops, Dijkstra {} hops cost {}",
                    b.edge_count(),
                    d.edge_count(),
                    d.total_cost
                ),
            ),
            (b, d) => (false, format!("errors: {:?} / {:?}", b.err(), d.err())),
        };
        results.push(TestResult {
            name: "scenario_no_uncertainty".into(),
            passed,
            detail,
        });
    }

    // Every door jammed: only the stairwell survives
    let jammed = HazardProfile {
        p_blocked: 1.0,
        ..HazardProfile::none()
    };
    if let Ok(g) = sample(&t, &jammed, Some(42)) {
        let sealed = search(&g, entry, victim, Algorithm::Dijkstra)
            .map(|r| !r.success && r.path.is_empty())
            .unwrap_or(false);
        results.push(TestResult {
            name: "scenario_doors_jammed_entry_sealed".into(),
            passed: sealed,
            detail: "entry room has no stairwell → success=false".into(),
        });
        let stairs = search(&g, Node::new(0, 6), Node::new(6, 6), Algorithm::Bfs)
            .map(|r| r.success && r.edge_count() == 6)
            .unwrap_or(false);
        results.push(TestResult {
            name: "scenario_doors_jammed_stairs_only".into(),
            passed: stairs,
            detail: "F0:R6 → F6:R6 over six flights".into(),
        });
    }

    // Same room
    let g = t.unperturbed();
    let same = Algorithm::ALL.iter().all(|&a| {
        search(&g, victim, victim, a)
            .map(|r| r.path == vec![victim] && r.total_cost == 0.0)
            .unwrap_or(false)
    });
    results.push(TestResult {
        name: "scenario_same_room".into(),
        passed: same,
        detail: "start == goal → one-node path, cost 0".into(),
    });

    // Isolated victim
    let mut g = t.unperturbed();
    let isolated = g.block_all_incident(victim).is_ok()
        && Algorithm::ALL.iter().all(|&a| {
            search(&g, entry, victim, a)
                .map(|r| !r.success)
                .unwrap_or(false)
        });
    results.push(TestResult {
        name: "scenario_isolated_goal".into(),
        passed: isolated,
        detail: "all incident edges blocked → success=false".into(),
    });

    // Unknown room
    results.push(TestResult {
        name: "scenario_unknown_room".into(),
        passed: search(&g, entry, Node::new(9, 1), Algorithm::Bfs).is_err(),
        detail: "F9:R1 → NodeNotFound".into(),
    });

    results
}

// ── 5. BFS vs Dijkstra ──────────────────────────────────────────────────

fn compare_algorithms(config: &SimulationConfig, args: &Args) -> Vec<TestResult> {
    println!("--- BFS vs Dijkstra ({} trials) ---", config.trials);
    let mut results = Vec::new();

    let outcomes = if args.parallel {
        run_trials_parallel(config)
    } else {
        run_trials(config)
    };
    let outcomes: Vec<TrialOutcome> = match outcomes {
        Ok(o) => o,
        Err(e) => {
            results.push(TestResult {
                name: "batch_run".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let costlier: Vec<u32> = outcomes
        .iter()
        .filter(|o| o.bfs.success && o.dijkstra.success)
        .filter(|o| o.dijkstra.total_cost > o.bfs.total_cost + 1e-9)
        .map(|o| o.trial)
        .collect();
    results.push(TestResult {
        name: "batch_dijkstra_never_costlier".into(),
        passed: costlier.is_empty(),
        detail: format!("Dijkstra cost ≤ BFS cost (violations: {:?})", costlier),
    });

    let reach_mismatch = outcomes
        .iter()
        .filter(|o| o.bfs.success != o.dijkstra.success)
        .count();
    results.push(TestResult {
        name: "batch_same_reachability".into(),
        passed: reach_mismatch == 0,
        detail: format!("{} trials disagree on reachability", reach_mismatch),
    });

    // Replay each trial's instance to confirm no blocked edge was used
    let mut blocked_used = Vec::new();
    if let Ok(template) = config.build_template() {
        for o in &outcomes {
            let Ok(g) = sample(&template, &config.hazard_profile(), Some(o.seed)) else {
                blocked_used.push(o.trial);
                continue;
            };
            for r in [&o.bfs, &o.dijkstra] {
                if r.success && path_cost(&g, &r.path).is_none() {
                    blocked_used.push(o.trial);
                }
            }
        }
    }
    results.push(TestResult {
        name: "batch_paths_avoid_blocked_edges".into(),
        passed: blocked_used.is_empty(),
        detail: format!("replayed {} instances (violations: {:?})", outcomes.len(), blocked_used),
    });

    let summary = Summary::from_outcomes(&outcomes);
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("summary serialization failed: {}", e),
        }
    } else {
        print_summary(&summary);
    }

    results
}

fn print_summary(summary: &Summary) {
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{:.2}", x));
    println!(
        "  {:<10} {:>9} {:>10} {:>10} {:>10}",
        "algorithm", "success%", "mean cost", "mean hops", "expanded"
    );
    for algorithm in Algorithm::ALL {
        let s = summary.for_algorithm(algorithm);
        println!(
            "  {:<10} {:>9.1} {:>10} {:>10} {:>10}",
            algorithm.to_string(),
            s.success_rate,
            fmt(s.mean_cost),
            fmt(s.mean_edges),
            fmt(s.mean_expanded)
        );
    }
    println!(
        "  Dijkstra strictly cheaper in {}/{} trials",
        summary.dijkstra_cheaper, summary.trials
    );
}
