//! Pure rescue-path logic for a burning building.
//!
//! The building is a graph of rooms. Each trial samples hazards onto a fixed
//! template (jammed doors, smoke-filled corridors, congested stairwells) and
//! then searches the result for a route from the entry point to the victim.
//! Everything here is plain data in, plain data out: no I/O, no global
//! state, and every random draw comes from a caller-supplied generator.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`building`] | Fixed floor/room topology (chain doors, corridors, stairs) |
//! | [`config`] | Batch configuration, validation, JSON loading |
//! | [`constants`] | Default dimensions, costs, and hazard probabilities |
//! | [`edge`] | Undirected edges with kind, blockage, and cost multiplier |
//! | [`error`] | `RescueError` and `ConfigError` |
//! | [`node`] | `(floor, room)` identity |
//! | [`sampling`] | Per-trial hazard sampling into a `SampledGraph` |
//! | [`search`] | BFS and Dijkstra behind one `search` entry point |
//! | [`simulation`] | Trial batches (sequential or rayon) and summaries |
//!
//! ```
//! use rescue_logic::building::build_template;
//! use rescue_logic::node::Node;
//! use rescue_logic::sampling::{sample, HazardProfile};
//! use rescue_logic::search::{search, Algorithm};
//!
//! let template = build_template(7, 12)?;
//! let graph = sample(&template, &HazardProfile::default(), Some(42))?;
//! let result = search(&graph, Node::new(0, 1), Node::new(6, 12), Algorithm::Dijkstra)?;
//! if result.success {
//!     assert_eq!(result.path.first(), Some(&Node::new(0, 1)));
//! }
//! # Ok::<(), rescue_logic::error::RescueError>(())
//! ```

pub mod building;
pub mod config;
pub mod constants;
pub mod edge;
pub mod error;
pub mod node;
pub mod sampling;
pub mod search;
pub mod simulation;

pub use building::{build_template, BuildingGraph};
pub use error::{ConfigError, RescueError};
pub use node::Node;
pub use sampling::{sample, HazardProfile, SampledGraph};
pub use search::{search, Algorithm, SearchResult};
