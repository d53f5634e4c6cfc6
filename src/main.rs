//! Cellsim entry point
//!
//! Usage: `cellsim [config.json]`
//!
//! Integrates a Gaussian cloud of cells, logging centroid and spread at each
//! output frame, then writes the final positions to stdout as JSON.

use std::io::Write;
use std::process::ExitCode;

use cellsim::consts::{DEFAULT_CELLS, END_TIME, INITIAL_MEAN, INITIAL_SIGMA, OUTPUT_FRAMES};
use cellsim::ensemble::{initial_condition_rng, sample_gaussian_cloud};
use cellsim::{Point, Result, Simulation, SimulationConfig};

/// Mean position and RMS distance from it
fn centroid_and_spread(points: &[Point]) -> (Point, f64) {
    if points.is_empty() {
        return (Point::ZERO, 0.0);
    }
    let n = points.len() as f64;
    let centroid = points.iter().copied().sum::<Point>() / n;
    let msd = points.iter().map(|p| p.distance_squared(centroid)).sum::<f64>() / n;
    (centroid, msd.sqrt())
}

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    log::info!(
        "size={} max_dt={} seed={} boundary={}",
        config.size,
        config.max_dt,
        config.seed,
        config.boundary
    );

    let mut rng = initial_condition_rng(config.seed);
    let points = sample_gaussian_cloud(DEFAULT_CELLS, INITIAL_MEAN, INITIAL_SIGMA, &mut rng)?;
    let mut sim = Simulation::from_points(points, config)?;

    let frame_time = END_TIME / OUTPUT_FRAMES as f64;
    for frame in 0..OUTPUT_FRAMES {
        let taken = sim.integrate(frame_time)?;
        let (centroid, spread) = centroid_and_spread(sim.positions());
        log::info!(
            "frame {} t={:.5} steps={} centroid=({:.4}, {:.4}) spread={:.4}",
            frame + 1,
            sim.time(),
            taken,
            centroid.x,
            centroid.y,
            spread
        );
    }

    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, sim.positions())?;
    writeln!(out)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
