//! Knot vector construction.

use dft_core::{DftError, Result};
use dft_math::{chord_lengths, polyline_length, Point3};
use serde::{Deserialize, Serialize};

/// Knot generation and sampling policy for the two standard knot
/// conventions.
///
/// `OpenUniform` repeats the first and last knot `order` times, so the
/// curve interpolates its end control points and the valid domain is
/// `[0, last_knot]`. `Uniform` spaces all knots equally with no repeats;
/// basis support is degenerate near the ends, so the valid domain shrinks
/// to `[order - 1, count]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnotStyle {
    OpenUniform,
    Uniform,
}

impl KnotStyle {
    /// Generate the knot vector for `count` control points of `order`.
    pub fn knots(self, count: usize, order: usize) -> Vec<f64> {
        match self {
            KnotStyle::OpenUniform => open_uniform_knots(count, order),
            KnotStyle::Uniform => uniform_knots(count, order),
        }
    }

    /// First parameter sampled by uniform-step approximation.
    pub(crate) fn start_t(self, order: usize) -> f64 {
        match self {
            KnotStyle::OpenUniform => 0.0,
            KnotStyle::Uniform => (order - 1) as f64,
        }
    }

    /// Upper end of the valid parameter domain.
    pub(crate) fn max_t(self, knots: &[f64], count: usize) -> f64 {
        match self {
            KnotStyle::OpenUniform => knots[knots.len() - 1],
            KnotStyle::Uniform => count as f64,
        }
    }

    /// Parameter increment covering the valid domain in `segments` steps.
    pub(crate) fn step_size(
        self,
        knots: &[f64],
        count: usize,
        order: usize,
        segments: usize,
    ) -> f64 {
        match self {
            KnotStyle::OpenUniform => self.max_t(knots, count) / segments as f64,
            KnotStyle::Uniform => (count - order + 1) as f64 / segments as f64,
        }
    }
}

/// Open-uniform knot vector: `order` zeros, interior knots ascending by 1,
/// `order` copies of the maximum. Length `count + order`.
pub fn open_uniform_knots(count: usize, order: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(count + order);
    let mut value = 0.0;
    for i in 0..count + order {
        if i >= order && i <= count {
            value += 1.0;
        }
        knots.push(value);
    }
    knots
}

/// Uniform (periodic) knot vector: `[0, 1, ..., count + order - 1]`.
pub fn uniform_knots(count: usize, order: usize) -> Vec<f64> {
    (0..count + order).map(|i| i as f64).collect()
}

/// Non-uniform knot vector weighted by the chord lengths of the control
/// polygon, scaled into `[0, count - order + 2]` with the trailing
/// `order - 1` knots pinned to the maximum.
///
/// The formula indexes one chord past each cumulative sum, so it is only
/// defined for `order >= 3` and at least `order + 1` control points, and
/// the control polygon must have nonzero length.
pub fn chord_length_knots(points: &[Point3], order: usize) -> Result<Vec<f64>> {
    let count = points.len();
    if order < 3 {
        return Err(DftError::Construction(format!(
            "chord-length knots require order >= 3, got {order}"
        )));
    }
    if count < order + 1 {
        return Err(DftError::Construction(format!(
            "chord-length knots require at least {} control points for order {order}, got {count}",
            order + 1
        )));
    }

    let spacing = chord_lengths(points);
    let total = polyline_length(points);
    if total == 0.0 {
        return Err(DftError::Construction(
            "chord-length knots require a control polygon of nonzero length".into(),
        ));
    }

    let span = (count - order + 2) as f64;
    let mut knots = vec![0.0; order];
    let mut cumulative = 0.0;
    for i in 1..=count - order + 1 {
        cumulative += spacing[i - 1];
        let weighted = i as f64 / span * spacing[i] + cumulative;
        knots.push(weighted / total * span);
    }
    knots.extend(std::iter::repeat(span).take(order - 1));
    debug_assert_eq!(knots.len(), count + order);
    Ok(knots)
}
