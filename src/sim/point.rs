//! Point and lattice coordinate types
//!
//! A cell is nothing but its position. Two cells may sit at exactly the same
//! coordinates, so containers of points are multisets keyed by position.

use glam::DVec2;

/// Position of a cell in the unit square.
///
/// Value-equal when both coordinates match exactly. Coordinates may leave
/// [0, 1) between the diffusion and boundary-correction phases of a step.
pub type Point = DVec2;

/// Integer lattice coordinate of a bucket: `(i, j) = (floor(x/cutoff), floor(y/cutoff))`.
///
/// Signed so Moore-neighborhood offsets may step off the lattice before the
/// active boundary policy resolves them.
pub type BucketCoord = (i64, i64);

/// The 3×3 Moore neighborhood, own bucket included.
pub const MOORE_OFFSETS: [BucketCoord; 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Build points from parallel coordinate sequences.
///
/// Returns `None` if the sequences differ in length.
pub fn zip_points(x: &[f64], y: &[f64]) -> Option<Vec<Point>> {
    if x.len() != y.len() {
        return None;
    }
    Some(x.iter().zip(y).map(|(&x, &y)| Point::new(x, y)).collect())
}

/// Whether a point lies in the closed unit square [0, 1]².
#[inline]
pub fn in_unit_square(p: Point) -> bool {
    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_value_equality() {
        assert_eq!(Point::new(0.25, 0.5), Point::new(0.25, 0.5));
        assert_ne!(Point::new(0.25, 0.5), Point::new(0.5, 0.25));
    }

    #[test]
    fn test_zip_points_rejects_length_mismatch() {
        assert!(zip_points(&[0.1, 0.2], &[0.1]).is_none());
        let pts = zip_points(&[0.1, 0.2], &[0.3, 0.4]).unwrap();
        assert_eq!(pts, vec![Point::new(0.1, 0.3), Point::new(0.2, 0.4)]);
    }

    #[test]
    fn test_moore_offsets_are_distinct_and_include_origin() {
        let mut offsets = MOORE_OFFSETS.to_vec();
        offsets.sort();
        offsets.dedup();
        assert_eq!(offsets.len(), 9);
        assert!(MOORE_OFFSETS.contains(&(0, 0)));
    }

    #[test]
    fn test_in_unit_square_edges() {
        assert!(in_unit_square(Point::new(0.0, 1.0)));
        assert!(!in_unit_square(Point::new(-1e-12, 0.5)));
        assert!(!in_unit_square(Point::new(0.5, 1.0 + 1e-12)));
    }
}
