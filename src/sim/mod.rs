//! Deterministic simulation module
//!
//! All model logic lives here. Runs are reproducible:
//! - Seeded RNG only, owned by the simulation and never reseeded
//! - One normal draw per coordinate per cell per step, in cell order
//! - Interaction partners read from the committed snapshot only
//! - No I/O

pub mod boundary;
pub mod buckets;
pub mod direct;
pub mod grid;
pub mod point;
pub mod state;
pub mod tick;

pub use boundary::BoundaryPolicy;
pub use buckets::BucketedPointSet;
pub use grid::{CUTOFF_FACTOR, GridTiling, SpatialHashGrid};
pub use point::{BucketCoord, MOORE_OFFSETS, Point};
pub use state::{Simulation, StepPhase};
pub use tick::{pair_displacement, step};
