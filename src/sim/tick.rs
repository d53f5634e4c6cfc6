//! Time stepping
//!
//! One step runs interaction, diffusion and boundary correction against the
//! `next` buffer, then commits it into the bucketed `current` set. Partners
//! for the interaction phase always come from `current`, so the result does
//! not depend on the order cells are visited in.

use rand::Rng;
use rand_distr::StandardNormal;

use super::boundary::BoundaryPolicy;
use super::buckets::BucketedPointSet;
use super::grid::SpatialHashGrid;
use super::point::Point;
use super::state::{Simulation, StepPhase};
use crate::error::{Error, Result};

/// Displacement of `p_i` caused by `p_j` over `dt`.
///
/// `(dt/size) · exp(-r/size) · (p_i - p_j)/r`, pushing `p_i` away from `p_j`.
/// Zero for coincident points.
#[inline]
pub fn pair_displacement(p_i: Point, p_j: Point, dt: f64, size: f64) -> Point {
    let d = p_i - p_j;
    let r = d.length();
    if r > 0.0 {
        d * ((dt / size) * (-r / size).exp() / r)
    } else {
        Point::ZERO
    }
}

/// Add the pairwise interaction displacement of every cell to `next`.
///
/// Partners are the points of `current` stored in the Moore neighborhood of
/// the cell's home bucket.
pub fn interactions(
    next: &mut [Point],
    current: &BucketedPointSet,
    grid: &SpatialHashGrid,
    dt: f64,
) {
    let size = grid.size();
    for p in next.iter_mut() {
        let p_i = *p;
        let home = grid.home_index(p_i);
        let mut acc = p_i;
        for &bucket in grid.neighbor_buckets(home) {
            for &p_j in current.points_in_bucket(bucket) {
                acc += pair_displacement(p_i, p_j, dt, size);
            }
        }
        *p = acc;
    }
}

/// Add `sqrt(2·dt)·N(0,1)` to each coordinate, x before y, cells in order.
pub fn diffusion<R: Rng>(next: &mut [Point], rng: &mut R, dt: f64) {
    let c = (2.0 * dt).sqrt();
    for p in next.iter_mut() {
        let nx: f64 = rng.sample(StandardNormal);
        let ny: f64 = rng.sample(StandardNormal);
        p.x += c * nx;
        p.y += c * ny;
    }
}

/// Apply the boundary policy to every cell.
pub fn boundaries(next: &mut [Point], policy: BoundaryPolicy) {
    for p in next.iter_mut() {
        *p = policy.apply(*p);
    }
}

/// Advance the simulation by a single step of length `dt`.
pub fn step(sim: &mut Simulation, dt: f64) {
    if sim.config.interactions {
        sim.phase = StepPhase::Interacting;
        interactions(&mut sim.next, &sim.current, &sim.grid, dt);
    }

    if sim.config.diffusion {
        sim.phase = StepPhase::Diffusing;
        diffusion(&mut sim.next, &mut sim.rng, dt);
    }

    sim.phase = StepPhase::CorrectingBoundary;
    boundaries(&mut sim.next, sim.grid.policy());

    sim.current.rebuild(&sim.grid, &sim.next);
    sim.phase = StepPhase::Committed;

    sim.steps += 1;
    sim.time += dt;
    log::trace!("step {} committed (dt={}, t={})", sim.steps, dt, sim.time);
}

impl Simulation {
    /// Advance by exactly `period`: whole steps of `max_dt`, then one step
    /// for any nonzero remainder.
    ///
    /// Returns the number of steps taken.
    ///
    /// # Panics
    /// If a cell ends a step outside [0, 1]². Boundary correction is applied
    /// once per step, so this happens when a single step moves a cell more
    /// than a domain width, i.e. `max_dt` is far too large for `size`.
    pub fn integrate(&mut self, period: f64) -> Result<usize> {
        if !period.is_finite() || period <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "period must be finite and > 0, got {period}"
            )));
        }
        let max_dt = self.config.max_dt;
        let n = (period / max_dt).floor() as usize;
        let final_dt = period - max_dt * n as f64;
        let total = n + usize::from(final_dt > 0.0);
        log::debug!("integrating for {} steps", total);

        for _ in 0..n {
            step(self, max_dt);
        }
        if final_dt > 0.0 {
            step(self, final_dt);
        }
        Ok(total)
    }
}
