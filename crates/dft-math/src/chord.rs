//! Polyline measurement helpers.

use crate::Point3;

/// Euclidean distances between consecutive points of a polyline.
///
/// Returns one entry per segment, so `points.len() - 1` values
/// (empty for fewer than two points).
pub fn chord_lengths(points: &[Point3]) -> Vec<f64> {
    points.windows(2).map(|w| w[0].distance(w[1])).collect()
}

/// Total length of the polyline through `points`.
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
