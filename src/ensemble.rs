//! Ensemble statistics
//!
//! Runs many independently seeded simulations from Gaussian initial clouds
//! and averages where the cells end up, frame by frame, on a fixed 2-D
//! histogram over the unit square. Samples run one after another.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::consts::{DEFAULT_CELLS, END_TIME, INITIAL_MEAN, INITIAL_SIGMA, OUTPUT_FRAMES};
use crate::error::{Error, Result};
use crate::sim::{Point, Simulation};

/// Mixed into the sample seed for the initial-position stream so it does not
/// replay the diffusion stream.
const INITIAL_CONDITION_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// RNG for drawing the initial positions of the run seeded with `seed`.
pub fn initial_condition_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed ^ INITIAL_CONDITION_SALT)
}

/// Draw `n` cells with both coordinates from N(mu, sigma), clamped into [0, 1].
pub fn sample_gaussian_cloud<R: Rng>(n: usize, mu: f64, sigma: f64, rng: &mut R) -> Result<Vec<Point>> {
    check_distribution(mu, sigma)?;
    let normal = Normal::new(mu, sigma)
        .map_err(|e| Error::InvalidParam(format!("initial distribution: {e}")))?;
    Ok((0..n)
        .map(|_| {
            let x: f64 = normal.sample(rng);
            let y: f64 = normal.sample(rng);
            Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
        })
        .collect())
}

/// `Normal::new` only rejects a non-finite `sigma`; a negative one would flip every draw.
fn check_distribution(mu: f64, sigma: f64) -> Result<()> {
    if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::InvalidParam(format!(
            "initial distribution needs finite mu and sigma >= 0, got mu={mu} sigma={sigma}"
        )));
    }
    Ok(())
}

/// Ensemble run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Number of runs; run `k` uses seed `k`
    pub samples: usize,
    /// Cells per run
    pub particles: usize,
    pub mu: f64,
    pub sigma: f64,
    /// Simulated time per run
    pub end_time: f64,
    /// Frames recorded per run, evenly spaced up to `end_time`
    pub outputs: usize,
    /// Histogram bins along x and y
    pub bins: (usize, usize),
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            particles: DEFAULT_CELLS,
            mu: INITIAL_MEAN,
            sigma: INITIAL_SIGMA,
            end_time: END_TIME,
            outputs: OUTPUT_FRAMES,
            bins: (20, 20),
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 || self.outputs == 0 {
            return Err(Error::InvalidParam(
                "samples and outputs must be > 0".into(),
            ));
        }
        if self.bins.0 == 0 || self.bins.1 == 0 {
            return Err(Error::InvalidParam(format!(
                "histogram bins must be > 0, got {:?}",
                self.bins
            )));
        }
        if !self.end_time.is_finite() || self.end_time <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "end_time must be finite and > 0, got {}",
                self.end_time
            )));
        }
        check_distribution(self.mu, self.sigma)
    }
}

/// Per-frame cell counts on a `bins.0 × bins.1` grid over [0, 1]².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyHistogram {
    bins: (usize, usize),
    frames: usize,
    /// Frame-major, then x bin, then y bin
    counts: Vec<f64>,
}

impl OccupancyHistogram {
    pub fn new(bins: (usize, usize), frames: usize) -> Self {
        Self {
            bins,
            frames,
            counts: vec![0.0; bins.0 * bins.1 * frames],
        }
    }

    #[inline]
    pub fn bins(&self) -> (usize, usize) {
        self.bins
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    fn frame_len(&self) -> usize {
        self.bins.0 * self.bins.1
    }

    /// Bin of a coordinate; the closed upper edge falls in the last bin.
    #[inline]
    fn bin_of(c: f64, n: usize) -> usize {
        ((c * n as f64).floor().max(0.0) as usize).min(n - 1)
    }

    /// Count `points` into `frame`.
    pub fn add(&mut self, frame: usize, points: &[Point]) {
        assert!(frame < self.frames, "frame {frame} out of range");
        let (bx, by) = self.bins;
        let base = frame * self.frame_len();
        for p in points {
            let ix = Self::bin_of(p.x, bx);
            let iy = Self::bin_of(p.y, by);
            self.counts[base + ix * by + iy] += 1.0;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.counts {
            *c *= factor;
        }
    }

    /// Counts for one frame, x-major.
    pub fn frame(&self, frame: usize) -> &[f64] {
        let len = self.frame_len();
        &self.counts[frame * len..(frame + 1) * len]
    }

    pub fn get(&self, frame: usize, ix: usize, iy: usize) -> f64 {
        self.frame(frame)[ix * self.bins.1 + iy]
    }

    /// Sum over all bins of one frame
    pub fn total(&self, frame: usize) -> f64 {
        self.frame(frame).iter().sum()
    }
}

/// Run the ensemble and return the sample-averaged histogram.
///
/// Every run starts from `base` with its seed replaced by the sample index.
pub fn run_ensemble(ensemble: &EnsembleConfig, base: &SimulationConfig) -> Result<OccupancyHistogram> {
    ensemble.validate()?;
    base.validate()?;

    let mut hist = OccupancyHistogram::new(ensemble.bins, ensemble.outputs);
    let frame_time = ensemble.end_time / ensemble.outputs as f64;

    for seed in 0..ensemble.samples as u64 {
        log::info!("running sample {}", seed);
        let mut rng = initial_condition_rng(seed);
        let points = sample_gaussian_cloud(ensemble.particles, ensemble.mu, ensemble.sigma, &mut rng)?;
        let mut sim = Simulation::from_points(points, base.clone().with_seed(seed))?;

        for frame in 0..ensemble.outputs {
            sim.integrate(frame_time)?;
            hist.add(frame, sim.positions());
        }
    }

    hist.scale(1.0 / ensemble.samples as f64);
    Ok(hist)
}
