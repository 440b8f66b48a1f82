//! DraftEngine geometry: B-spline and NURBS curve evaluation.

pub mod spline;

pub use spline::{BSplineCurve, KnotStyle, RationalBSplineCurve};
