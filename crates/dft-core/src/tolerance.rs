/// Tolerance management for curve evaluation and comparisons.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for coordinate comparisons (in model units)
    pub linear: f64,
    /// Parameter-space tolerance for comparisons along a curve domain
    pub parameter: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-10;
    pub const DEFAULT_PARAMETER: f64 = 1e-9;

    /// Width of the snap band at the upper end of a curve's parameter
    /// domain. Parameters within this distance of `max_t` are clamped to
    /// `max_t` exactly before basis evaluation.
    pub const PARAM_SNAP: f64 = 5e-6;

    pub fn new(linear: f64, parameter: f64) -> Self {
        Self { linear, parameter }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            parameter: Self::DEFAULT_PARAMETER,
        }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-6,
            parameter: 1e-6,
        }
    }

    /// Check if two coordinates are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a value is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two parameters are equal within parameter tolerance
    pub fn param_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.parameter
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_eq() {
        let tol = Tolerance::default();
        assert!(tol.linear_eq(1.0, 1.0 + 1e-12));
        assert!(!tol.linear_eq(1.0, 1.0 + 1e-8));
    }

    #[test]
    fn test_param_snap_band() {
        // The snap band must be wider than typical accumulated step error
        // but far below one knot interval.
        assert!(Tolerance::PARAM_SNAP > 1e-7);
        assert!(Tolerance::PARAM_SNAP < 1e-3);
    }

    #[test]
    fn test_is_zero() {
        let tol = Tolerance::loose();
        assert!(tol.is_zero(1e-8));
        assert!(!tol.is_zero(1e-3));
    }
}
