//! Wind vector geometry.
//!
//! Directions are meteorological: degrees clockwise from north, pointing to
//! where the wind comes *from*. The `(u, v)` vector points where the air goes.

use crate::Real;

/// Wind direction and speed to `(u, v)` components.
#[inline]
pub fn wd2uv(wd_deg: Real, ws: Real) -> (Real, Real) {
    let wdr = wd_deg.to_radians();
    (-ws * wdr.sin(), -ws * wdr.cos())
}

/// `(u, v)` components to wind direction in `[0, 360)`.
#[inline]
pub fn uv2wd(u: Real, v: Real) -> Real {
    (180.0 + u.atan2(v).to_degrees()).rem_euclid(360.0)
}

/// Weighted vector mean of directions and speeds.
///
/// Returns the mean `(u, v)`; `|(u, v)|` is the vector-averaged speed and
/// `uv2wd(u, v)` the averaged direction. Opposite winds cancel.
pub fn vector_mean(wd_deg: &[Real], ws: &[Real], weights: &[Real]) -> (Real, Real) {
    let mut u = 0.0;
    let mut v = 0.0;
    for ((&d, &s), &w) in wd_deg.iter().zip(ws).zip(weights) {
        let (du, dv) = wd2uv(d, s);
        u += w * du;
        v += w * dv;
    }
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn west_wind_blows_east() {
        let (u, v) = wd2uv(270.0, 8.0);
        assert!((u - 8.0).abs() < 1e-12);
        assert!(v.abs() < 1e-12);
        assert!((uv2wd(u, v) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn direction_round_trip_wraps() {
        for wd in [0.0, 1.0, 90.0, 179.5, 180.0, 359.0] {
            let (u, v) = wd2uv(wd, 3.0);
            let back = uv2wd(u, v);
            let diff = (back - wd).rem_euclid(360.0);
            assert!(diff < 1e-9 || 360.0 - diff < 1e-9, "{wd} -> {back}");
        }
    }

    #[test]
    fn opposite_winds_cancel() {
        let (u, v) = vector_mean(
            &[0.0, 90.0, 180.0, 270.0],
            &[7.0; 4],
            &[0.25; 4],
        );
        assert!(u.hypot(v) < 1e-12);
    }

    #[test]
    fn averaging_across_north_has_no_wraparound_bias() {
        let (u, v) = vector_mean(&[350.0, 10.0], &[5.0, 5.0], &[0.5, 0.5]);
        let wd = uv2wd(u, v);
        assert!(wd < 1e-9 || 360.0 - wd < 1e-9, "got {wd}");
    }

    proptest! {
        #[test]
        fn mean_of_equal_directions_is_that_direction(
            wd in 0.0f64..360.0,
            speeds in proptest::collection::vec(0.5f64..25.0, 1..6),
        ) {
            let n = speeds.len();
            let (u, v) = vector_mean(&vec![wd; n], &speeds, &vec![1.0 / n as f64; n]);
            let diff = (uv2wd(u, v) - wd).rem_euclid(360.0);
            prop_assert!(diff < 1e-8 || 360.0 - diff < 1e-8);
        }
    }
}
