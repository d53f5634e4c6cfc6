//! All-pairs reference kernels on coordinate arrays
//!
//! Same physics as the bucketed pipeline but over separate `x`/`y` slices
//! and without the grid: every pair interacts. O(n²), used as a correctness
//! oracle and by callers that hold plain coordinate buffers.

use rand::Rng;
use rand_distr::StandardNormal;

use super::boundary::BoundaryPolicy;
use super::point::Point;
use super::tick::pair_displacement;

/// Add the interaction displacement from every `(x[j], y[j])` to `(xn[i], yn[i])`.
///
/// Positions are read from `x`/`y` only, so `xn`/`yn` may already hold
/// partial updates.
///
/// # Panics
/// If the four slices differ in length.
pub fn interactions(xn: &mut [f64], yn: &mut [f64], x: &[f64], y: &[f64], dt: f64, size: f64) {
    let n = x.len();
    assert!(
        y.len() == n && xn.len() == n && yn.len() == n,
        "coordinate arrays differ in length"
    );
    for i in 0..n {
        let p_i = Point::new(x[i], y[i]);
        for j in 0..n {
            let d = pair_displacement(p_i, Point::new(x[j], y[j]), dt, size);
            xn[i] += d.x;
            yn[i] += d.y;
        }
    }
}

/// Add `sqrt(2·dt)·N(0,1)` to every coordinate, x before y per cell.
pub fn diffusion<R: Rng>(xn: &mut [f64], yn: &mut [f64], rng: &mut R, dt: f64) {
    assert_eq!(xn.len(), yn.len(), "coordinate arrays differ in length");
    let c = (2.0 * dt).sqrt();
    for (x, y) in xn.iter_mut().zip(yn.iter_mut()) {
        let nx: f64 = rng.sample(StandardNormal);
        let ny: f64 = rng.sample(StandardNormal);
        *x += c * nx;
        *y += c * ny;
    }
}

pub fn boundaries(xn: &mut [f64], yn: &mut [f64], policy: BoundaryPolicy) {
    for c in xn.iter_mut().chain(yn.iter_mut()) {
        *c = policy.apply_coord(*c);
    }
}

/// One full all-pairs step on coordinate arrays, in place.
pub fn step<R: Rng>(
    x: &mut [f64],
    y: &mut [f64],
    rng: &mut R,
    dt: f64,
    size: f64,
    policy: BoundaryPolicy,
) {
    let (mut xn, mut yn) = (x.to_vec(), y.to_vec());
    interactions(&mut xn, &mut yn, x, y, dt, size);
    diffusion(&mut xn, &mut yn, rng, dt);
    boundaries(&mut xn, &mut yn, policy);
    x.copy_from_slice(&xn);
    y.copy_from_slice(&yn);
}
