//! Simulation parameters
//!
//! Serializable so a driver run can be reproduced from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SEED, DEFAULT_SIZE, TIMESTEP_RATIO};
use crate::error::{Error, Result};
use crate::sim::{BoundaryPolicy, GridTiling};

/// Largest time step that keeps the mean diffusion step at
/// `TIMESTEP_RATIO × size`.
pub fn default_max_dt(size: f64) -> f64 {
    (TIMESTEP_RATIO * size).powi(2) / 4.0
}

/// Parameters fixed for the lifetime of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Interaction length scale (cell size)
    pub size: f64,
    /// Maximum integration step
    pub max_dt: f64,
    /// RNG seed for the diffusion noise
    pub seed: u64,
    pub boundary: BoundaryPolicy,
    pub tiling: GridTiling,

    // === Step phases ===
    /// Pairwise exponential interaction
    pub interactions: bool,
    /// Brownian noise
    pub diffusion: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            max_dt: default_max_dt(DEFAULT_SIZE),
            seed: DEFAULT_SEED,
            boundary: BoundaryPolicy::default(),
            tiling: GridTiling::default(),
            interactions: true,
            diffusion: true,
        }
    }
}

impl SimulationConfig {
    /// Config for the given length scale and step, everything else default.
    pub fn new(size: f64, max_dt: f64) -> Self {
        Self {
            size,
            max_dt,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_tiling(mut self, tiling: GridTiling) -> Self {
        self.tiling = tiling;
        self
    }

    /// Check the scalar preconditions. Grid feasibility of `size` is checked
    /// when the grid is built.
    pub fn validate(&self) -> Result<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "size must be finite and > 0, got {}",
                self.size
            )));
        }
        if !self.max_dt.is_finite() || self.max_dt <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "max_dt must be finite and > 0, got {}",
                self.max_dt
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
