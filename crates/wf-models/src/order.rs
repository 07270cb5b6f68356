//! Downwind turbine ordering.

use nalgebra::DMatrix;
use wf_core::{Var, WfError, WfResult, uv2wd, vector_mean, wd2uv};
use wf_data::FarmData;

/// Mean ambient wind direction of one state over all turbines.
///
/// Falls back to the first turbine's direction when the vector mean
/// vanishes.
fn state_direction(wd: &[f64]) -> f64 {
    let ones = vec![1.0; wd.len()];
    let (u, v) = vector_mean(wd, &ones, &ones);
    if u.hypot(v) < 1e-12 * wd.len() as f64 {
        wd[0]
    } else {
        uv2wd(u, v)
    }
}

/// Sort turbines by their position along the mean wind vector of each state.
///
/// Ties keep ascending turbine index. Result shape `(state, turbine)`; row
/// `s` is a permutation of `0..n_turbines`.
pub fn downwind_order(fdata: &FarmData) -> WfResult<DMatrix<usize>> {
    let n_states = fdata.n_states();
    let n_turbines = fdata.n_turbines();
    let wd = fdata.get(Var::AmbWd).map_err(|_| WfError::MissingInput {
        what: format!("'{}' is required for the downwind order", Var::AmbWd),
    })?;

    let mut order = DMatrix::from_element(n_states, n_turbines, 0usize);
    for s in 0..n_states {
        if n_turbines == 0 {
            break;
        }
        let row: Vec<f64> = wd.row(s).iter().copied().collect();
        let (nx, ny) = wd2uv(state_direction(&row), 1.0);
        let mut proj: Vec<(f64, usize)> = (0..n_turbines)
            .map(|t| {
                let h = fdata.hub(s, t);
                (h.x * nx + h.y * ny, t)
            })
            .collect();
        proj.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (oi, (_, t)) in proj.into_iter().enumerate() {
            order[(s, oi)] = t;
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use proptest::prelude::*;
    use wf_data::Coords;

    fn farm(xs: &[(f64, f64)], wd: &[f64]) -> FarmData {
        let n_states = wd.len();
        let txyh = Coords::from_fn(n_states, xs.len(), |_, t| {
            Vector3::new(xs[t].0, xs[t].1, 100.0)
        });
        let mut fdata = FarmData::new(0, txyh);
        let amb = wf_data::Field::from_fn(n_states, xs.len(), |s, _| wd[s]);
        fdata.insert(Var::AmbWd, amb).unwrap();
        fdata
    }

    #[test]
    fn west_wind_sorts_by_x() {
        let fdata = farm(&[(500.0, 0.0), (0.0, 0.0), (1000.0, 0.0)], &[270.0, 90.0]);
        let order = downwind_order(&fdata).unwrap();
        assert_eq!(order.row(0).iter().copied().collect::<Vec<_>>(), vec![1, 0, 2]);
        assert_eq!(order.row(1).iter().copied().collect::<Vec<_>>(), vec![2, 0, 1]);
    }

    #[test]
    fn ties_keep_index_order() {
        let fdata = farm(&[(0.0, 300.0), (0.0, 0.0), (0.0, -300.0)], &[270.0]);
        let order = downwind_order(&fdata).unwrap();
        assert_eq!(order.row(0).iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn missing_direction_is_missing_input() {
        let fdata = FarmData::new(0, Coords::from_element(1, 2, Vector3::zeros()));
        assert!(matches!(
            downwind_order(&fdata),
            Err(WfError::MissingInput { .. })
        ));
    }

    proptest! {
        #[test]
        fn rows_are_permutations(
            xy in prop::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..12),
            wd in prop::collection::vec(0.0f64..360.0, 1..6),
        ) {
            let fdata = farm(&xy, &wd);
            let order = downwind_order(&fdata).unwrap();
            for s in 0..wd.len() {
                let mut row: Vec<usize> = order.row(s).iter().copied().collect();
                row.sort_unstable();
                prop_assert_eq!(row, (0..xy.len()).collect::<Vec<_>>());
            }
        }
    }
}
