//! Spatial hash grid over the unit square
//!
//! Cells only interact noticeably within `3 × size` of each other, so the
//! domain is tiled with square buckets at least that wide and a cell only
//! looks for partners in the 3×3 block of buckets around its own.
//!
//! Buckets live on a `sqrt_n_buckets × sqrt_n_buckets` lattice flattened
//! row-major: `index = i × sqrt_n_buckets + j` for `(i, j) = (floor(x/cutoff), floor(y/cutoff))`.

use serde::{Deserialize, Serialize};

use super::boundary::BoundaryPolicy;
use super::point::{BucketCoord, MOORE_OFFSETS, Point, in_unit_square};
use crate::error::{Error, Result};

/// Interaction range in units of `size`; the `exp(-r/size)` tail past it is dropped.
pub const CUTOFF_FACTOR: f64 = 3.0;

/// How the bucket width is derived from the interaction range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GridTiling {
    /// Widen buckets to `1 / sqrt_n_buckets` so the lattice tiles the domain exactly.
    #[default]
    Exact,
    /// Keep buckets at `3 × size`. The strip past the last full bucket is
    /// folded into the last row and column.
    Truncated,
}

/// Bucketing function plus the neighbor structure of its lattice.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    size: f64,
    cutoff: f64,
    sqrt_n_buckets: i64,
    policy: BoundaryPolicy,
    tiling: GridTiling,
    /// Distinct in-range Moore neighbors of every bucket, own bucket first.
    neighbors: Vec<Vec<usize>>,
}

impl SpatialHashGrid {
    /// Build the grid for interaction length scale `size`.
    ///
    /// Errors if `size` is not finite, not positive, or so large that not
    /// even one bucket fits in the domain.
    pub fn new(size: f64, policy: BoundaryPolicy, tiling: GridTiling) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "size must be finite and > 0, got {size}"
            )));
        }
        let mut cutoff = CUTOFF_FACTOR * size;
        let sqrt_n_buckets = (1.0 / cutoff).floor() as i64;
        if sqrt_n_buckets < 1 {
            return Err(Error::InvalidParam(format!(
                "size must be <= 1/{CUTOFF_FACTOR} for the grid to hold a bucket, got {size}"
            )));
        }
        if tiling == GridTiling::Exact {
            cutoff = 1.0 / sqrt_n_buckets as f64;
        }

        let mut grid = Self {
            size,
            cutoff,
            sqrt_n_buckets,
            policy,
            tiling,
            neighbors: Vec::new(),
        };
        grid.neighbors = grid.build_neighbor_table();

        log::debug!(
            "grid: size={} cutoff={} buckets={}x{} policy={} tiling={:?}",
            size,
            cutoff,
            sqrt_n_buckets,
            sqrt_n_buckets,
            policy,
            tiling
        );
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Bucket width
    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[inline]
    pub fn sqrt_n_buckets(&self) -> i64 {
        self.sqrt_n_buckets
    }

    #[inline]
    pub fn total_buckets(&self) -> usize {
        (self.sqrt_n_buckets * self.sqrt_n_buckets) as usize
    }

    #[inline]
    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    #[inline]
    pub fn tiling(&self) -> GridTiling {
        self.tiling
    }

    /// Raw lattice coordinate of a point. Off-lattice for points outside the
    /// covered domain.
    #[inline]
    pub fn bucket_coordinate(&self, p: Point) -> BucketCoord {
        (
            (p.x / self.cutoff).floor() as i64,
            (p.y / self.cutoff).floor() as i64,
        )
    }

    /// Row-major flatten. No validation.
    #[inline]
    pub fn bucket_index(&self, c: BucketCoord) -> i64 {
        c.0 * self.sqrt_n_buckets + c.1
    }

    /// Periodic neighbor: wraps a negative component up by `sqrt_n_buckets`
    /// and a component strictly greater than `sqrt_n_buckets` down by it.
    ///
    /// A component landing exactly on `sqrt_n_buckets` is left there; its
    /// flattened index either aliases the first bucket of the next row or
    /// lies past the lattice.
    pub fn offset_periodic(&self, c: BucketCoord, offset: BucketCoord) -> BucketCoord {
        let n = self.sqrt_n_buckets;
        let wrap = |v: i64| {
            if v < 0 {
                v + n
            } else if v > n {
                v - n
            } else {
                v
            }
        };
        (wrap(c.0 + offset.0), wrap(c.1 + offset.1))
    }

    /// Bounded neighbor: plain addition, see [`Self::in_domain`].
    #[inline]
    pub fn offset(&self, c: BucketCoord, offset: BucketCoord) -> BucketCoord {
        (c.0 + offset.0, c.1 + offset.1)
    }

    #[inline]
    pub fn in_domain(&self, c: BucketCoord) -> bool {
        let n = self.sqrt_n_buckets;
        (0..n).contains(&c.0) && (0..n).contains(&c.1)
    }

    /// Neighbor coordinate under the active policy, `None` when the bounded
    /// policy steps off the lattice.
    pub fn neighbor(&self, c: BucketCoord, offset: BucketCoord) -> Option<BucketCoord> {
        match self.policy {
            BoundaryPolicy::Periodic => Some(self.offset_periodic(c, offset)),
            BoundaryPolicy::Reflecting => {
                let n = self.offset(c, offset);
                self.in_domain(n).then_some(n)
            }
        }
    }

    /// Bucket a point is stored in.
    ///
    /// Points on the closed upper edge, or in the strip a truncated lattice
    /// does not reach, go to the last row/column.
    ///
    /// # Panics
    /// If the point lies outside [0, 1]²: boundary correction has been
    /// skipped or a cell moved more than a domain width in one step.
    pub fn home_bucket(&self, p: Point) -> BucketCoord {
        assert!(
            in_unit_square(p),
            "point ({}, {}) escaped the unit square",
            p.x,
            p.y
        );
        let last = self.sqrt_n_buckets - 1;
        let (i, j) = self.bucket_coordinate(p);
        (i.clamp(0, last), j.clamp(0, last))
    }

    /// Flattened [`Self::home_bucket`]; always in `[0, total_buckets)`.
    #[inline]
    pub fn home_index(&self, p: Point) -> usize {
        self.bucket_index(self.home_bucket(p)) as usize
    }

    /// Buckets searched for interaction partners of a cell stored in `index`.
    #[inline]
    pub fn neighbor_buckets(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    fn build_neighbor_table(&self) -> Vec<Vec<usize>> {
        let n = self.sqrt_n_buckets;
        let total = self.total_buckets() as i64;
        let mut table = Vec::with_capacity(self.total_buckets());
        for i in 0..n {
            for j in 0..n {
                let home = (i, j);
                let mut list: Vec<usize> = Vec::with_capacity(MOORE_OFFSETS.len());
                // Own bucket first so iteration order is stable across policies
                list.push(self.bucket_index(home) as usize);
                for &offset in MOORE_OFFSETS.iter() {
                    let Some(c) = self.neighbor(home, offset) else {
                        continue;
                    };
                    let idx = self.bucket_index(c);
                    if !(0..total).contains(&idx) {
                        continue;
                    }
                    let idx = idx as usize;
                    // Small lattices wrap several offsets onto one bucket
                    if !list.contains(&idx) {
                        list.push(idx);
                    }
                }
                table.push(list);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(size: f64, policy: BoundaryPolicy, tiling: GridTiling) -> SpatialHashGrid {
        SpatialHashGrid::new(size, policy, tiling).unwrap()
    }

    #[test]
    fn test_exact_tiling_covers_domain() {
        let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
        // floor(1 / 0.15) = 6
        assert_eq!(g.sqrt_n_buckets(), 6);
        assert_eq!(g.total_buckets(), 36);
        assert!((g.cutoff() - 1.0 / 6.0).abs() < 1e-15);
        assert!(g.cutoff() >= CUTOFF_FACTOR * g.size());
    }

    #[test]
    fn test_truncated_tiling_keeps_cutoff() {
        let g = grid(0.05, BoundaryPolicy::Reflecting, GridTiling::Truncated);
        assert_eq!(g.sqrt_n_buckets(), 6);
        assert!((g.cutoff() - 0.15).abs() < 1e-15);
        // 0.95 is in the uncovered strip past 6 * 0.15 = 0.9
        assert_eq!(g.bucket_coordinate(Point::new(0.95, 0.1)), (6, 0));
        assert_eq!(g.home_bucket(Point::new(0.95, 0.1)), (5, 0));
    }

    #[test]
    fn test_rejects_bad_sizes() {
        for size in [0.0, -0.1, f64::NAN, f64::INFINITY, 0.34] {
            let err = SpatialHashGrid::new(size, BoundaryPolicy::Periodic, GridTiling::Exact);
            assert!(err.is_err(), "size {size} should be rejected");
        }
        assert!(SpatialHashGrid::new(1.0 / 3.0, BoundaryPolicy::Periodic, GridTiling::Exact).is_ok());
    }

    #[test]
    fn test_bucket_index_is_row_major() {
        let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
        assert_eq!(g.bucket_index((0, 0)), 0);
        assert_eq!(g.bucket_index((0, 5)), 5);
        assert_eq!(g.bucket_index((1, 0)), 6);
        assert_eq!(g.bucket_index((5, 5)), 35);
        let p = Point::new(0.2, 0.9);
        assert_eq!(g.bucket_coordinate(p), (1, 5));
        assert_eq!(g.home_index(p), 11);
    }

    #[test]
    fn test_offset_periodic_wraps_low_side() {
        let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
        assert_eq!(g.offset_periodic((0, 0), (-1, -1)), (5, 5));
        assert_eq!(g.offset_periodic((2, 3), (1, -1)), (3, 2));
    }

    #[test]
    fn test_offset_periodic_leaves_exact_side_length() {
        let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
        // Strictly-greater-than wrap: 5 + 1 == 6 stays 6
        assert_eq!(g.offset_periodic((5, 5), (1, 1)), (6, 6));
        assert_eq!(g.offset_periodic((7, 0), (0, 0)), (1, 0));
    }

    #[test]
    fn test_reflecting_edges_have_fewer_neighbors() {
        let g = grid(0.05, BoundaryPolicy::Reflecting, GridTiling::Exact);
        assert_eq!(g.neighbor_buckets(g.bucket_index((0, 0)) as usize).len(), 4);
        assert_eq!(g.neighbor_buckets(g.bucket_index((0, 3)) as usize).len(), 6);
        assert_eq!(g.neighbor_buckets(g.bucket_index((3, 3)) as usize).len(), 9);
        assert_eq!(g.neighbor((0, 0), (-1, 0)), None);
        assert_eq!(g.neighbor((0, 0), (1, 1)), Some((1, 1)));
    }

    #[test]
    fn test_periodic_low_corner_sees_wrapped_buckets() {
        let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
        let list = g.neighbor_buckets(0);
        assert_eq!(list.len(), 9);
        assert_eq!(list[0], 0);
        assert!(list.contains(&35));
        assert!(list.contains(&5));
        assert!(list.contains(&30));
    }

    #[test]
    fn test_small_lattice_neighbors_are_deduplicated() {
        // floor(1 / 0.9) = 1: a single bucket
        let g = grid(0.3, BoundaryPolicy::Periodic, GridTiling::Exact);
        assert_eq!(g.total_buckets(), 1);
        assert_eq!(g.neighbor_buckets(0), &[0]);

        // floor(1 / 0.45) = 2
        let g = grid(0.15, BoundaryPolicy::Periodic, GridTiling::Exact);
        assert_eq!(g.sqrt_n_buckets(), 2);
        for idx in 0..g.total_buckets() {
            let list = g.neighbor_buckets(idx);
            let mut sorted = list.to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), list.len());
        }
    }

    #[test]
    fn test_upper_edge_goes_to_last_bucket() {
        let g = grid(0.05, BoundaryPolicy::Reflecting, GridTiling::Exact);
        assert_eq!(g.home_bucket(Point::new(1.0, 1.0)), (5, 5));
    }

    #[test]
    #[should_panic(expected = "escaped the unit square")]
    fn test_home_bucket_panics_outside_domain() {
        let g = grid(0.05, BoundaryPolicy::Reflecting, GridTiling::Exact);
        g.home_bucket(Point::new(-0.01, 0.5));
    }

    proptest! {
        #[test]
        fn every_point_maps_into_lattice(x in 0.0f64..1.0, y in 0.0f64..1.0) {
            for policy in [BoundaryPolicy::Periodic, BoundaryPolicy::Reflecting] {
                for tiling in [GridTiling::Exact, GridTiling::Truncated] {
                    let g = grid(0.05, policy, tiling);
                    let n = g.sqrt_n_buckets();
                    let (i, j) = g.home_bucket(Point::new(x, y));
                    prop_assert!((0..n).contains(&i) && (0..n).contains(&j));
                    prop_assert!(g.home_index(Point::new(x, y)) < g.total_buckets());
                }
            }
        }

        #[test]
        fn exact_tiling_needs_no_clamp(x in 0.0f64..0.999, y in 0.0f64..0.999) {
            let g = grid(0.05, BoundaryPolicy::Periodic, GridTiling::Exact);
            let p = Point::new(x, y);
            prop_assert_eq!(g.bucket_coordinate(p), g.home_bucket(p));
        }

        #[test]
        fn neighbor_lists_stay_in_range(size in 0.01f64..0.3) {
            for policy in [BoundaryPolicy::Periodic, BoundaryPolicy::Reflecting] {
                let g = grid(size, policy, GridTiling::Exact);
                for idx in 0..g.total_buckets() {
                    let list = g.neighbor_buckets(idx);
                    prop_assert_eq!(list[0], idx);
                    prop_assert!(list.len() <= 9);
                    prop_assert!(list.iter().all(|&b| b < g.total_buckets()));
                }
            }
        }
    }
}
