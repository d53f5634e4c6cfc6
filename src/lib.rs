//! Cellsim - 2-D stochastic cell model
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spatial hash grid, step pipeline)
//! - `config`: Serializable simulation parameters
//! - `ensemble`: Occupancy histograms over many seeded runs
//! - `error`: Precondition errors

pub mod config;
pub mod ensemble;
pub mod error;
pub mod sim;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use sim::{BoundaryPolicy, GridTiling, Point, Simulation};

/// Model constants
pub mod consts {
    /// Seed used when the caller does not supply one
    pub const DEFAULT_SEED: u64 = 0;

    /// Default cell size (interaction length scale)
    pub const DEFAULT_SIZE: f64 = 0.02;
    /// Mean diffusion step per `max_dt`, as a fraction of cell size
    pub const TIMESTEP_RATIO: f64 = 0.23;

    /// Driver defaults: cells start as a Gaussian cloud
    pub const DEFAULT_CELLS: usize = 100;
    pub const INITIAL_MEAN: f64 = 0.5;
    pub const INITIAL_SIGMA: f64 = 0.05;
    /// Simulated time covered by a driver or ensemble run
    pub const END_TIME: f64 = 0.01;
    /// Output frames per run
    pub const OUTPUT_FRAMES: usize = 10;
}
