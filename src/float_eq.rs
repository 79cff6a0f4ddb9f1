//! Approximate equality for mesh geometry.
//!
//! Geometry that goes through a write/read cycle is stored as relative
//! offsets, so coordinates can come back a few ulps away from where they
//! started.

use float_cmp::ApproxEq;

/// Absolute tolerance for coordinates and color channels.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

pub trait ApproxEqGeometry {
    fn approx_eq_geom(self, other: Self) -> bool;
}

impl ApproxEqGeometry for f64 {
    fn approx_eq_geom(self, other: f64) -> bool {
        self.approx_eq(other, (GEOMETRY_EPSILON, 4))
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! assert_approx_eq_geom {
    ($left:expr, $right:expr) => {{
        match ($left, $right) {
            (l, r) => {
                if !$crate::float_eq::ApproxEqGeometry::approx_eq_geom(l, r) {
                    panic!(
                        r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        l, r
                    )
                }
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_approx_equal() {
        assert!(1.0_f64.approx_eq_geom(1.0 + 1e-12));
        assert!(!1.0_f64.approx_eq_geom(1.0 + 1e-6));
        assert!((0.1_f64 + 0.2).approx_eq_geom(0.3));
    }

    #[test]
    fn assert_approx_eq_geom_should_not_panic() {
        assert_approx_eq_geom!(42_f64, 42_f64);
    }

    #[test]
    #[should_panic]
    fn assert_approx_eq_geom_should_panic() {
        assert_approx_eq_geom!(3_f64, 42_f64);
    }
}
