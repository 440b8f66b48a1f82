//! Cox-de Boor basis function evaluation.

use super::knots::KnotStyle;

/// Guarded span ratio. A vanishing numerator short-circuits to zero before
/// the division, so zero-width spans from repeated knots contribute nothing
/// instead of producing NaN.
#[inline]
#[allow(clippy::float_cmp)]
fn ratio(num: f64, den: f64) -> f64 {
    if num != 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Iterative Cox-de Boor evaluator for one curve's basis functions.
///
/// Borrows the immutable curve data; each call allocates its own working
/// buffers, so evaluation is reentrant and safe to run from multiple
/// threads against the same curve. The order-elevation loop is
/// double-buffered: every level reads only the previous level's row, never
/// values updated at the same level.
pub struct BasisEvaluator<'a> {
    knots: &'a [f64],
    order: usize,
    count: usize,
    style: KnotStyle,
}

impl<'a> BasisEvaluator<'a> {
    pub fn new(knots: &'a [f64], order: usize, count: usize, style: KnotStyle) -> Self {
        debug_assert!(
            knots.len() == count + order,
            "knot vector length must be count + order, got {} for count {} order {}",
            knots.len(),
            count,
            order
        );
        debug_assert!(order >= 2);
        Self {
            knots,
            order,
            count,
            style,
        }
    }

    /// Length of the first-order basis row.
    fn working_len(&self) -> usize {
        self.count + self.order - 1
    }

    /// First-order seed: 1 on the half-open knot span containing `t`.
    fn first_order(&self, t: f64, seed: &mut [f64]) {
        for (i, v) in seed.iter_mut().enumerate() {
            *v = if self.knots[i] <= t && t < self.knots[i + 1] {
                1.0
            } else {
                0.0
            };
        }
    }

    /// Basis function values at `t`, one per control point.
    ///
    /// `point(t) = sum(values[i] * control_point[i])`.
    #[allow(clippy::float_cmp)]
    pub fn values(&self, t: f64) -> Vec<f64> {
        let len = self.working_len();
        let knots = self.knots;
        let mut prev = vec![0.0; len];
        let mut cur = vec![0.0; len];
        self.first_order(t, &mut prev);

        for ord in 2..=self.order {
            for i in 0..self.count + self.order - ord {
                let d = ratio((t - knots[i]) * prev[i], knots[i + ord - 1] - knots[i]);
                let e = ratio((knots[i + ord] - t) * prev[i + 1], knots[i + ord] - knots[i + 1]);
                cur[i] = d + e;
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        prev.truncate(self.count);
        // The half-open seed interval excludes the final knot itself; the
        // recursion would otherwise return an all-zero basis there. The
        // comparison is exact on purpose: callers snap to max_t first.
        if t == knots[knots.len() - 1] {
            prev[self.count - 1] = 1.0;
        }
        prev
    }

    /// Basis values with first and second derivatives at `t`, each one per
    /// control point, propagated through the same elevation pass.
    #[allow(clippy::float_cmp)]
    pub fn values_with_derivatives(&self, t: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let len = self.working_len();
        let knots = self.knots;
        let mut n_prev = vec![0.0; len];
        self.first_order(t, &mut n_prev);

        // Endpoint fix-up on the seed row, before elevation. The uniform
        // variant shifts the support down one span so the one-sided
        // derivatives at the domain end stay defined.
        match self.style {
            KnotStyle::OpenUniform => {
                if t == knots[knots.len() - 1] {
                    n_prev[self.count - 1] = 1.0;
                }
            }
            KnotStyle::Uniform => {
                if t == knots[self.count] {
                    n_prev[self.count - 1] = 1.0;
                    n_prev[self.count] = 0.0;
                }
            }
        }

        let mut n_cur = vec![0.0; len];
        let mut d1_prev = vec![0.0; len];
        let mut d1_cur = vec![0.0; len];
        let mut d2_prev = vec![0.0; len];
        let mut d2_cur = vec![0.0; len];

        for ord in 2..=self.order {
            for i in 0..self.count + self.order - ord {
                let left = t - knots[i];
                let right = knots[i + ord] - t;
                let span_l = knots[i + ord - 1] - knots[i];
                let span_r = knots[i + ord] - knots[i + 1];

                n_cur[i] =
                    ratio(left * n_prev[i], span_l) + ratio(right * n_prev[i + 1], span_r);
                // Product rule applied once and twice to the two terms above.
                d1_cur[i] = ratio(n_prev[i], span_l) - ratio(n_prev[i + 1], span_r)
                    + ratio(left * d1_prev[i], span_l)
                    + ratio(right * d1_prev[i + 1], span_r);
                d2_cur[i] = 2.0 * (ratio(d1_prev[i], span_l) - ratio(d1_prev[i + 1], span_r))
                    + ratio(left * d2_prev[i], span_l)
                    + ratio(right * d2_prev[i + 1], span_r);
            }
            std::mem::swap(&mut n_prev, &mut n_cur);
            std::mem::swap(&mut d1_prev, &mut d1_cur);
            std::mem::swap(&mut d2_prev, &mut d2_cur);
        }

        n_prev.truncate(self.count);
        d1_prev.truncate(self.count);
        d2_prev.truncate(self.count);
        (n_prev, d1_prev, d2_prev)
    }
}
