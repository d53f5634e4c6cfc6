//! Boundary policies for the unit-square domain
//!
//! A policy is chosen once per simulation. It decides both how a cell that
//! stepped outside [0, 1) is brought back, and how the spatial hash grid
//! resolves neighbor buckets that fall off the lattice.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// Domain edge treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Torus: cells leaving one side re-enter on the opposite side, and the
    /// grid wraps neighbor buckets around the lattice.
    #[default]
    Periodic,
    /// Low edges mirror, high edges shift down by one. Neighbor buckets off
    /// the lattice contribute no interaction partners.
    Reflecting,
}

impl BoundaryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::Periodic => "periodic",
            BoundaryPolicy::Reflecting => "reflecting",
        }
    }

    /// Correct a single coordinate.
    ///
    /// Only one correction is applied, so a coordinate more than one domain
    /// width outside stays outside.
    #[inline]
    pub fn apply_coord(&self, c: f64) -> f64 {
        match self {
            BoundaryPolicy::Periodic => {
                if c < 0.0 {
                    1.0 + c
                } else if c >= 1.0 {
                    c - 1.0
                } else {
                    c
                }
            }
            // Mirror low, shift high
            BoundaryPolicy::Reflecting => {
                if c < 0.0 {
                    -c
                } else if c > 1.0 {
                    c - 1.0
                } else {
                    c
                }
            }
        }
    }

    /// Correct both coordinates of a point.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.apply_coord(p.x), self.apply_coord(p.y))
    }
}

impl std::fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
