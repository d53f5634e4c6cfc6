//! Multiset of points partitioned into grid buckets
//!
//! Explicit array of buckets rather than a hashed container, so iterating a
//! single bucket is a slice walk and insertion order within a bucket is kept.
//! Rebuilt wholesale every step; individual points are never removed.

use super::grid::SpatialHashGrid;
use super::point::Point;

#[derive(Debug, Clone, Default)]
pub struct BucketedPointSet {
    buckets: Vec<Vec<Point>>,
    len: usize,
}

impl BucketedPointSet {
    /// Empty set with `total_buckets` buckets.
    pub fn new(total_buckets: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); total_buckets],
            len: 0,
        }
    }

    /// Empty set sized for `grid`.
    pub fn for_grid(grid: &SpatialHashGrid) -> Self {
        Self::new(grid.total_buckets())
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of stored points, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Place `p` in its home bucket.
    ///
    /// # Panics
    /// If the point is outside the unit square or the grid disagrees with
    /// this set about the number of buckets.
    pub fn insert(&mut self, grid: &SpatialHashGrid, p: Point) {
        let index = grid.home_index(p);
        assert!(
            index < self.buckets.len(),
            "bucket index {} outside [0, {})",
            index,
            self.buckets.len()
        );
        self.buckets[index].push(p);
        self.len += 1;
    }

    /// Empty every bucket, keeping allocations for the next rebuild.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Replace the contents with `points`.
    pub fn rebuild(&mut self, grid: &SpatialHashGrid, points: &[Point]) {
        self.clear();
        for &p in points {
            self.insert(grid, p);
        }
    }

    /// Points stored in bucket `index`.
    ///
    /// # Panics
    /// If `index` is past the lattice.
    #[inline]
    pub fn points_in_bucket(&self, index: usize) -> &[Point] {
        assert!(
            index < self.buckets.len(),
            "bucket index {} outside [0, {})",
            index,
            self.buckets.len()
        );
        &self.buckets[index]
    }

    /// All stored points, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.buckets.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BoundaryPolicy, GridTiling};

    fn grid() -> SpatialHashGrid {
        SpatialHashGrid::new(0.05, BoundaryPolicy::Periodic, GridTiling::Exact).unwrap()
    }

    #[test]
    fn test_insert_places_point_in_its_bucket() {
        let g = grid();
        let mut set = BucketedPointSet::for_grid(&g);
        let p = Point::new(0.2, 0.9);
        set.insert(&g, p);

        assert_eq!(set.len(), 1);
        assert_eq!(set.points_in_bucket(11), &[p]);
        let others: usize = (0..set.bucket_count())
            .filter(|&b| b != 11)
            .map(|b| set.points_in_bucket(b).len())
            .sum();
        assert_eq!(others, 0);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let g = grid();
        let mut set = BucketedPointSet::for_grid(&g);
        let p = Point::new(0.5, 0.5);
        set.insert(&g, p);
        set.insert(&g, p);
        assert_eq!(set.len(), 2);
        assert_eq!(set.points_in_bucket(g.home_index(p)), &[p, p]);
    }

    #[test]
    fn test_clear_empties_all_buckets() {
        let g = grid();
        let mut set = BucketedPointSet::for_grid(&g);
        set.insert(&g, Point::new(0.1, 0.1));
        set.insert(&g, Point::new(0.9, 0.9));
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert_eq!(set.bucket_count(), g.total_buckets());
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let g = grid();
        let mut set = BucketedPointSet::for_grid(&g);
        set.insert(&g, Point::new(0.1, 0.1));

        let pts = [Point::new(0.3, 0.3), Point::new(0.7, 0.2), Point::new(0.3, 0.3)];
        set.rebuild(&g, &pts);
        assert_eq!(set.len(), 3);
        let mut stored: Vec<Point> = set.iter().copied().collect();
        stored.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        assert_eq!(stored, vec![pts[0], pts[2], pts[1]]);
    }

    #[test]
    #[should_panic(expected = "bucket index 4 outside [0, 4)")]
    fn test_out_of_range_bucket_lookup_panics() {
        let set = BucketedPointSet::new(4);
        set.points_in_bucket(4);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_insert_into_mismatched_set_panics() {
        let g = grid();
        let mut set = BucketedPointSet::new(1);
        set.insert(&g, Point::new(0.9, 0.9));
    }
}
