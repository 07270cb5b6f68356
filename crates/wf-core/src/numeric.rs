use crate::WfError;

/// Floating point type of every field.
pub type Real = f64;

/// Absolute and relative comparison bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Sums of normalized weights.
    pub const WEIGHTS: Tolerances = Tolerances {
        abs: 1e-9,
        rel: 0.0,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// `|a - b|` within `tol.abs`, or within `tol.rel` of the larger magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Pass `v` through, or report it as [`WfError::NonFinite`].
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, WfError> {
    if !v.is_finite() {
        return Err(WfError::NonFinite { what, value: v });
    }
    Ok(v)
}

/// Linear interpolation in a table with ascending `xs`.
///
/// Returns `None` outside `[xs[0], xs[n-1]]`.
pub fn interp_linear(xs: &[Real], ys: &[Real], x: Real) -> Option<Real> {
    let n = xs.len();
    if n == 0 || ys.len() != n || x < xs[0] || x > xs[n - 1] {
        return None;
    }
    let i = xs.partition_point(|&xi| xi <= x);
    if i >= n {
        return Some(ys[n - 1]);
    }
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    if x1 == x0 {
        return Some(y0);
    }
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_sums_compare_absolutely() {
        let tol = Tolerances::WEIGHTS;
        assert!(nearly_equal(0.1 + 0.2 + 0.7, 1.0, tol));
        assert!(!nearly_equal(1.01, 1.0, tol));
        assert!(nearly_equal(8.0, 8.0 + 1e-10, Tolerances::default()));
    }

    #[test]
    fn ensure_finite_rejects_infinity() {
        let err = ensure_finite(Real::INFINITY, "wind speed").unwrap_err();
        assert!(matches!(err, WfError::NonFinite { what: "wind speed", .. }));
        assert_eq!(ensure_finite(7.5, "wind speed").unwrap(), 7.5);
    }

    #[test]
    fn interp_inside_and_outside() {
        let xs = [3.0, 4.0, 6.0];
        let ys = [0.0, 10.0, 30.0];
        assert_eq!(interp_linear(&xs, &ys, 3.0), Some(0.0));
        assert_eq!(interp_linear(&xs, &ys, 5.0), Some(20.0));
        assert_eq!(interp_linear(&xs, &ys, 6.0), Some(30.0));
        assert_eq!(interp_linear(&xs, &ys, 2.9), None);
        assert_eq!(interp_linear(&xs, &ys, 6.1), None);
    }
}
