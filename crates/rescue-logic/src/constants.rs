//! Default building dimensions, edge costs, and hazard probabilities.
//!
//! Plain `f64`/`u32` constants with no runtime dependency. The simtest
//! harness and [`crate::config::SimulationConfig::default`] both read these.

pub mod building {
    pub const NUM_FLOORS: u32 = 7;
    pub const ROOMS_PER_FLOOR: u32 = 12;
    /// Room number that hosts the stairwell on every floor.
    pub const STAIR_ROOM: u32 = 6;
}

pub mod costs {
    /// Base cost of any unobstructed edge.
    pub const FREE_COST: f64 = 1.0;
    /// Multiplier applied to a corridor edge filled with smoke.
    pub const SMOKE_COST: f64 = 5.0;
    /// Multiplier applied to a congested stair edge.
    pub const STAIR_COST: f64 = 2.0;
}

pub mod hazards {
    /// Chance that a door (chain or corridor edge) is blocked in one trial.
    pub const P_BLOCKED: f64 = 0.15;
    /// Chance that a corridor edge is smoke-filled in one trial.
    pub const P_SMOKE: f64 = 0.30;
    /// Chance that a stair edge is congested in one trial.
    pub const P_CONGESTED: f64 = 0.20;
}

pub mod simulation {
    pub const SEED: u64 = 42;
    pub const TRIALS: u32 = 100;
}
