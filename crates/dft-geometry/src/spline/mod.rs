//! B-spline and NURBS curve evaluation.
//!
//! Knot vectors are plain 0-indexed `Vec<f64>` of length
//! `control_point_count + order`. The two standard knot conventions
//! (open-uniform and uniform/periodic) are modeled as a [`KnotStyle`]
//! strategy on a single curve type rather than separate curve types;
//! non-uniform knot vectors are supplied explicitly.

mod basis;
mod bspline;
mod knots;

pub use basis::BasisEvaluator;
pub use bspline::{BSplineCurve, RationalBSplineCurve};
pub use knots::{chord_length_knots, open_uniform_knots, uniform_knots, KnotStyle};
