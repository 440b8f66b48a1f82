//! B-spline and rational B-spline (NURBS) curves.

use dft_core::{DftError, Result, Tolerance};
use dft_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::basis::BasisEvaluator;
use super::knots::{chord_length_knots, KnotStyle};

/// A B-spline curve defined by control points, order, and a knot vector.
///
/// The knot vector is generated by the chosen [`KnotStyle`] or supplied
/// explicitly for the non-uniform case. Immutable after construction, so
/// evaluation is reentrant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineCurve {
    control_points: Vec<Point3>,
    knots: Vec<f64>,
    order: usize,
    style: KnotStyle,
}

impl BSplineCurve {
    /// Build a curve whose knots follow `style`.
    ///
    /// Fails if `order < 2` or there are fewer control points than `order`.
    pub fn new(control_points: Vec<Point3>, order: usize, style: KnotStyle) -> Result<Self> {
        validate_counts(control_points.len(), order)?;
        let knots = style.knots(control_points.len(), order);
        Ok(Self {
            control_points,
            knots,
            order,
            style,
        })
    }

    /// Build a curve over a caller-supplied, generally non-uniform knot
    /// vector. Evaluation follows the open-curve conventions.
    pub fn with_knots(control_points: Vec<Point3>, order: usize, knots: Vec<f64>) -> Result<Self> {
        validate_counts(control_points.len(), order)?;
        let expected = control_points.len() + order;
        if knots.len() != expected {
            return Err(DftError::Knots(format!(
                "expected {} knots for {} control points of order {}, got {}",
                expected,
                control_points.len(),
                order,
                knots.len()
            )));
        }
        if knots.windows(2).any(|w| w[0] > w[1]) {
            return Err(DftError::Knots(
                "knot vector must be non-decreasing".into(),
            ));
        }
        Ok(Self {
            control_points,
            knots,
            order,
            style: KnotStyle::OpenUniform,
        })
    }

    /// Build a curve whose knot spacing follows the cumulative chord
    /// length of the control polygon.
    pub fn with_chord_length_knots(control_points: Vec<Point3>, order: usize) -> Result<Self> {
        let knots = chord_length_knots(&control_points, order)?;
        Self::with_knots(control_points, order, knots)
    }

    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn count(&self) -> usize {
        self.control_points.len()
    }

    pub fn style(&self) -> KnotStyle {
        self.style
    }

    /// Upper end of the valid parameter domain.
    pub fn max_t(&self) -> f64 {
        self.style.max_t(&self.knots, self.count())
    }

    /// Basis function values at `t`, one per control point.
    pub fn basis(&self, t: f64) -> Vec<f64> {
        self.evaluator().values(t)
    }

    /// Evaluate the curve at `t` in `[0, max_t]`.
    ///
    /// Parameters within `Tolerance::PARAM_SNAP` of `max_t` are clamped to
    /// `max_t`; parameters further outside the domain are rejected.
    pub fn point(&self, t: f64) -> Result<Point3> {
        let t = self.clamp_param(t)?;
        Ok(self.raw_point(t))
    }

    /// Evaluate position, first, and second derivative vectors at `t`.
    pub fn point_with_derivatives(&self, t: f64) -> Result<(Point3, Vector3, Vector3)> {
        let t = self.clamp_param(t)?;
        let (basis, d1, d2) = self.evaluator().values_with_derivatives(t);
        Ok((
            weighted_sum(&basis, &self.control_points),
            weighted_sum(&d1, &self.control_points),
            weighted_sum(&d2, &self.control_points),
        ))
    }

    /// Sample `segments + 1` points at uniform parameter steps over the
    /// valid domain. Lazy and restartable; the iterator only reads
    /// immutable curve state. `segments == 0` yields the single start
    /// point.
    pub fn approximate(&self, segments: usize) -> impl Iterator<Item = Point3> + '_ {
        self.parameters(segments).map(|t| self.raw_point(self.snap(t)))
    }

    /// The uniform parameter steps sampled by [`Self::approximate`].
    pub(crate) fn parameters(&self, segments: usize) -> impl Iterator<Item = f64> + '_ {
        let start = self.style.start_t(self.order);
        let step = if segments == 0 {
            0.0
        } else {
            self.style
                .step_size(&self.knots, self.count(), self.order, segments)
        };
        (0..=segments).map(move |i| start + step * i as f64)
    }

    fn evaluator(&self) -> BasisEvaluator<'_> {
        BasisEvaluator::new(&self.knots, self.order, self.count(), self.style)
    }

    /// Clamp into the boundary snap band so the endpoint fix-up in the
    /// basis recursion sees `max_t` exactly.
    pub(crate) fn snap(&self, t: f64) -> f64 {
        let max_t = self.max_t();
        if (max_t - t).abs() < Tolerance::PARAM_SNAP {
            max_t
        } else {
            t
        }
    }

    /// Snap, then reject parameters outside `[0, max_t]`.
    pub(crate) fn clamp_param(&self, t: f64) -> Result<f64> {
        let snapped = self.snap(t);
        if snapped < 0.0 || snapped > self.max_t() {
            return Err(DftError::Domain(format!(
                "parameter {} outside [0, {}]",
                t,
                self.max_t()
            )));
        }
        Ok(snapped)
    }

    /// Evaluate without the domain check; `t` must already be snapped.
    fn raw_point(&self, t: f64) -> Point3 {
        weighted_sum(&self.basis(t), &self.control_points)
    }
}

/// A rational B-spline (NURBS) curve: a [`BSplineCurve`] with one weight
/// per control point, basis values renormalized by the weighted sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RationalBSplineCurve {
    curve: BSplineCurve,
    weights: Vec<f64>,
}

impl RationalBSplineCurve {
    /// Fails if the weight count differs from the control point count, a
    /// weight is negative, or the inner curve is invalid.
    pub fn new(
        control_points: Vec<Point3>,
        weights: Vec<f64>,
        order: usize,
        style: KnotStyle,
    ) -> Result<Self> {
        validate_weights(control_points.len(), &weights)?;
        Ok(Self {
            curve: BSplineCurve::new(control_points, order, style)?,
            weights,
        })
    }

    /// Rational curve over an explicit non-uniform knot vector; exact
    /// conics need both repeated knots and weights.
    pub fn with_knots(
        control_points: Vec<Point3>,
        weights: Vec<f64>,
        order: usize,
        knots: Vec<f64>,
    ) -> Result<Self> {
        validate_weights(control_points.len(), &weights)?;
        Ok(Self {
            curve: BSplineCurve::with_knots(control_points, order, knots)?,
            weights,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn control_points(&self) -> &[Point3] {
        self.curve.control_points()
    }

    pub fn order(&self) -> usize {
        self.curve.order()
    }

    pub fn count(&self) -> usize {
        self.curve.count()
    }

    pub fn max_t(&self) -> f64 {
        self.curve.max_t()
    }

    /// Weighted, renormalized basis values at `t`.
    ///
    /// If every active basis-weight product vanishes the result is all
    /// zero rather than a division by zero.
    pub fn basis(&self, t: f64) -> Vec<f64> {
        rational_basis(&self.curve.basis(t), &self.weights)
    }

    /// Evaluate the rational curve at `t` in `[0, max_t]`, with the same
    /// snap band as the non-rational curve.
    pub fn point(&self, t: f64) -> Result<Point3> {
        let t = self.curve.clamp_param(t)?;
        Ok(self.raw_point(t))
    }

    /// Sample `segments + 1` points at uniform parameter steps.
    pub fn approximate(&self, segments: usize) -> impl Iterator<Item = Point3> + '_ {
        self.curve
            .parameters(segments)
            .map(|t| self.raw_point(self.curve.snap(t)))
    }

    fn raw_point(&self, t: f64) -> Point3 {
        weighted_sum(&self.basis(t), self.curve.control_points())
    }
}

fn validate_counts(points: usize, order: usize) -> Result<()> {
    if order < 2 {
        return Err(DftError::Construction(format!(
            "order must be at least 2, got {order}"
        )));
    }
    if points < order {
        return Err(DftError::Construction(format!(
            "need at least {order} control points for order {order}, got {points}"
        )));
    }
    Ok(())
}

fn validate_weights(points: usize, weights: &[f64]) -> Result<()> {
    if points != weights.len() {
        return Err(DftError::Construction(format!(
            "control point count {} does not match weight count {}",
            points,
            weights.len()
        )));
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(DftError::Construction(
            "weights must be non-negative".into(),
        ));
    }
    Ok(())
}

fn weighted_sum(basis: &[f64], points: &[Point3]) -> Point3 {
    let mut acc = Point3::ZERO;
    for (b, p) in basis.iter().zip(points) {
        acc += *b * *p;
    }
    acc
}

/// NURBS reweighting: `r[i] = basis[i] * w[i] / sum(basis[j] * w[j])`,
/// or all zero when the weighted sum vanishes exactly.
#[allow(clippy::float_cmp)]
fn rational_basis(basis: &[f64], weights: &[f64]) -> Vec<f64> {
    let sum: f64 = basis.iter().zip(weights).map(|(b, w)| b * w).sum();
    if sum == 0.0 {
        return vec![0.0; basis.len()];
    }
    basis.iter().zip(weights).map(|(b, w)| b * w / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dft_math::DVec3;

    fn zigzag(n: usize) -> Vec<Point3> {
        (0..n)
            .map(|i| DVec3::new(i as f64, if i % 2 == 0 { 0.0 } else { 2.0 }, i as f64 * 0.5))
            .collect()
    }

    #[test]
    fn test_construction_errors() {
        assert!(BSplineCurve::new(zigzag(3), 4, KnotStyle::OpenUniform).is_err());
        assert!(BSplineCurve::new(zigzag(3), 1, KnotStyle::OpenUniform).is_err());
        assert!(BSplineCurve::new(zigzag(4), 4, KnotStyle::OpenUniform).is_ok());
    }

    #[test]
    fn test_with_knots_validation() {
        let too_short = vec![0.0, 0.0, 1.0];
        assert!(BSplineCurve::with_knots(zigzag(4), 3, too_short).is_err());

        let decreasing = vec![0.0, 0.0, 0.0, 2.0, 1.0, 3.0, 3.0];
        assert!(BSplineCurve::with_knots(zigzag(4), 3, decreasing).is_err());
    }

    #[test]
    fn test_endpoint_interpolation() {
        let points = zigzag(6);
        let curve = BSplineCurve::new(points.clone(), 4, KnotStyle::OpenUniform).unwrap();

        let start = curve.point(0.0).unwrap();
        assert!((start - points[0]).length() < 1e-12);

        let end = curve.point(curve.max_t()).unwrap();
        assert!((end - points[5]).length() < 1e-12);
    }

    #[test]
    fn test_quadratic_bezier_midpoint() {
        // Order 3 with 3 control points is the quadratic Bezier curve.
        let curve = BSplineCurve::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.5, 1.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
            ],
            3,
            KnotStyle::OpenUniform,
        )
        .unwrap();

        let mid = curve.point(curve.max_t() * 0.5).unwrap();
        assert!((mid.x - 0.5).abs() < 1e-12);
        assert!((mid.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_snap() {
        let curve = BSplineCurve::new(zigzag(5), 3, KnotStyle::OpenUniform).unwrap();
        let max_t = curve.max_t();

        let exact = curve.point(max_t).unwrap();
        let near_below = curve.point(max_t - 1e-7).unwrap();
        let near_above = curve.point(max_t + 1e-7).unwrap();
        assert!((exact - near_below).length() < 1e-9);
        assert!((exact - near_above).length() < 1e-9);
    }

    #[test]
    fn test_domain_errors() {
        let curve = BSplineCurve::new(zigzag(5), 3, KnotStyle::OpenUniform).unwrap();
        assert!(curve.point(-0.5).is_err());
        assert!(curve.point(curve.max_t() + 1.0).is_err());
        assert!(curve.point_with_derivatives(-0.5).is_err());
    }

    #[test]
    fn test_approximate_open() {
        let points = zigzag(6);
        let curve = BSplineCurve::new(points.clone(), 3, KnotStyle::OpenUniform).unwrap();

        let samples: Vec<Point3> = curve.approximate(20).collect();
        assert_eq!(samples.len(), 21);
        assert!((samples[0] - points[0]).length() < 1e-12);
        assert!((samples[20] - points[5]).length() < 1e-12);

        // restartable: a second pass yields the same sequence
        let again: Vec<Point3> = curve.approximate(20).collect();
        assert_eq!(samples, again);
    }

    #[test]
    fn test_approximate_zero_segments() {
        let points = zigzag(6);
        let open = BSplineCurve::new(points.clone(), 3, KnotStyle::OpenUniform).unwrap();
        let samples: Vec<Point3> = open.approximate(0).collect();
        assert_eq!(samples.len(), 1);
        assert!((samples[0] - points[0]).length() < 1e-12);

        let uniform = BSplineCurve::new(points.clone(), 3, KnotStyle::Uniform).unwrap();
        let samples: Vec<Point3> = uniform.approximate(0).collect();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].is_finite());
        assert!((samples[0] - (points[0] + points[1]) * 0.5).length() < 1e-12);
    }

    #[test]
    fn test_approximate_uniform_domain() {
        let points = zigzag(6);
        let curve = BSplineCurve::new(points.clone(), 3, KnotStyle::Uniform).unwrap();

        let params: Vec<f64> = curve.parameters(10).collect();
        assert_eq!(params.len(), 11);
        assert!((params[0] - 2.0).abs() < 1e-12);
        assert!((params[10] - 6.0).abs() < 1e-12);

        let samples: Vec<Point3> = curve.approximate(10).collect();
        assert_eq!(samples.len(), 11);
        assert!(samples.iter().all(|p| p.is_finite()));
        // A periodic-style quadratic starts at the midpoint of the first
        // two control points, not at the first control point.
        assert!((samples[0] - (points[0] + points[1]) * 0.5).length() < 1e-12);
    }

    #[test]
    fn test_linear_curve_derivatives() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, 2.0, -1.0);
        let curve = BSplineCurve::new(vec![a, b], 2, KnotStyle::OpenUniform).unwrap();

        let (p, d1, d2) = curve.point_with_derivatives(0.5).unwrap();
        assert!((p - (a + b) * 0.5).length() < 1e-12);
        assert!((d1 - (b - a)).length() < 1e-12);
        assert!(d2.length() < 1e-12);
    }

    #[test]
    fn test_derivatives_at_open_end() {
        // Quadratic Bezier end tangent is 2 * (P2 - P1).
        let p0 = DVec3::new(0.0, 0.0, 0.0);
        let p1 = DVec3::new(0.5, 1.0, 0.0);
        let p2 = DVec3::new(1.0, 0.0, 0.0);
        let curve = BSplineCurve::new(vec![p0, p1, p2], 3, KnotStyle::OpenUniform).unwrap();

        let (p, d1, _) = curve.point_with_derivatives(curve.max_t()).unwrap();
        assert!((p - p2).length() < 1e-12);
        assert!((d1 - (p2 - p1) * 2.0).length() < 1e-12);
    }

    #[test]
    fn test_chord_length_curve_spans_endpoints() {
        let points = zigzag(6);
        let curve = BSplineCurve::with_chord_length_knots(points.clone(), 3).unwrap();

        // The leading knot has multiplicity `order`, so the start is
        // interpolated; the end relies on the basis endpoint fix-up.
        let start = curve.point(0.0).unwrap();
        assert!((start - points[0]).length() < 1e-12);
        let end = curve.point(curve.max_t()).unwrap();
        assert!((end - points[5]).length() < 1e-12);

        let samples: Vec<Point3> = curve.approximate(16).collect();
        assert_eq!(samples.len(), 17);
        assert!(samples.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_rational_weight_count_mismatch() {
        let err = RationalBSplineCurve::new(
            zigzag(5),
            vec![1.0; 4],
            3,
            KnotStyle::OpenUniform,
        );
        assert!(err.is_err());

        let err = RationalBSplineCurve::new(
            zigzag(5),
            vec![1.0, 1.0, -0.5, 1.0, 1.0],
            3,
            KnotStyle::OpenUniform,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rational_equal_weights_reduce() {
        let points = zigzag(6);
        let plain = BSplineCurve::new(points.clone(), 4, KnotStyle::OpenUniform).unwrap();
        let rational =
            RationalBSplineCurve::new(points, vec![2.5; 6], 4, KnotStyle::OpenUniform).unwrap();

        for (p, r) in plain.approximate(25).zip(rational.approximate(25)) {
            assert!(
                (p - r).length() < 1e-12,
                "equal-weight NURBS deviates: {:?} vs {:?}",
                p,
                r
            );
        }
    }

    #[test]
    fn test_rational_zero_weight_guard() {
        let rational = RationalBSplineCurve::new(
            zigzag(5),
            vec![0.0; 5],
            3,
            KnotStyle::OpenUniform,
        )
        .unwrap();

        let basis = rational.basis(1.0);
        assert!(basis.iter().all(|&v| v == 0.0));
        let p = rational.point(1.0).unwrap();
        assert!(p.is_finite());
        assert_eq!(p, DVec3::ZERO);
    }

    #[test]
    fn test_rational_basis_partition() {
        let rational = RationalBSplineCurve::new(
            zigzag(6),
            vec![1.0, 0.5, 2.0, 0.25, 1.5, 1.0],
            3,
            KnotStyle::OpenUniform,
        )
        .unwrap();

        for i in 0..=20 {
            let t = rational.max_t() * i as f64 / 20.0;
            let sum: f64 = rational.basis(t).iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "rational basis not normalized at t={}: {}",
                t,
                sum
            );
        }
    }

    #[test]
    fn test_curves_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BSplineCurve>();
        assert_send_sync::<RationalBSplineCurve>();
    }
}
