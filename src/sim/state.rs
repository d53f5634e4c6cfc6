//! Simulation state
//!
//! Two views of the same cells are kept: `current`, bucketed and read-only
//! for the duration of a step, and `next`, the ordered working buffer every
//! phase writes into. They agree at step boundaries.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::buckets::BucketedPointSet;
use super::grid::SpatialHashGrid;
use super::point::{Point, in_unit_square, zip_points};
use crate::config::SimulationConfig;
use crate::consts::DEFAULT_SEED;
use crate::error::{Error, Result};

/// Phase of the step pipeline most recently entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// Accumulating pairwise displacements into `next`
    Interacting,
    /// Adding Brownian noise to `next`
    Diffusing,
    /// Bringing `next` back into the domain
    CorrectingBoundary,
    /// `current` rebuilt from `next`; both agree
    Committed,
}

/// A fixed population of cells diffusing and interacting in the unit square
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) config: SimulationConfig,
    pub(super) grid: SpatialHashGrid,
    pub(super) current: BucketedPointSet,
    pub(super) next: Vec<Point>,
    pub(super) rng: Pcg32,
    pub(super) phase: StepPhase,
    pub(super) steps: u64,
    pub(super) time: f64,
}

impl Simulation {
    /// Create a simulation from parallel coordinate sequences.
    ///
    /// `seed` defaults to [`DEFAULT_SEED`]. All other parameters take their
    /// [`SimulationConfig`] defaults.
    pub fn new(x: &[f64], y: &[f64], size: f64, max_dt: f64, seed: Option<u64>) -> Result<Self> {
        let points = zip_points(x, y).ok_or_else(|| {
            Error::InvalidParam(format!(
                "x and y must have equal length, got {} and {}",
                x.len(),
                y.len()
            ))
        })?;
        let config = SimulationConfig::new(size, max_dt).with_seed(seed.unwrap_or(DEFAULT_SEED));
        Self::from_points(points, config)
    }

    /// Create a simulation from initial positions and a full config.
    ///
    /// Errors if the config is invalid or any position is non-finite or
    /// outside [0, 1]².
    pub fn from_points(points: Vec<Point>, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        if let Some((i, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || !in_unit_square(**p))
        {
            return Err(Error::InvalidParam(format!(
                "position {} = ({}, {}) must be finite and inside [0, 1]^2",
                i, p.x, p.y
            )));
        }

        let grid = SpatialHashGrid::new(config.size, config.boundary, config.tiling)?;
        let mut current = BucketedPointSet::for_grid(&grid);
        current.rebuild(&grid, &points);

        log::debug!(
            "simulation: {} cells, size={}, max_dt={}, seed={}",
            points.len(),
            config.size,
            config.max_dt,
            config.seed
        );

        Ok(Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            grid,
            current,
            next: points,
            phase: StepPhase::Committed,
            steps: 0,
            time: 0.0,
        })
    }

    /// Positions after the most recent commit, in construction order.
    #[inline]
    pub fn positions(&self) -> &[Point] {
        &self.next
    }

    /// Positions as an interleaved `[x0, y0, x1, y1, ...]` buffer.
    #[inline]
    pub fn positions_flat(&self) -> &[f64] {
        bytemuck::cast_slice(&self.next)
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.next.len()
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    /// Bucketed snapshot used as the interaction-partner source.
    #[inline]
    pub fn current(&self) -> &BucketedPointSet {
        &self.current
    }

    #[inline]
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Steps taken since construction
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time elapsed since construction
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }
}
