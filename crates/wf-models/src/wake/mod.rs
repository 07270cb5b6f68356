//! Wake models.
//!
//! All models here are distance-sliced: the wake of a source turbine is a
//! function of the downstream distance `x` and a lateral/vertical offset.
//! The helpers in this module turn such a sliced evaluation into additions
//! to a [`WakeDeltas`] accumulator.

mod bastankhah;
mod crespo_hernandez;
mod jensen;
mod linear_decay;

pub use bastankhah::Bastankhah2014;
pub use crespo_hernandez::CrespoHernandez;
pub use jensen::Jensen;
pub use linear_decay::LinearDecay;

use std::collections::BTreeMap;

use nalgebra::{DMatrix, Vector2};
use wf_core::{Var, WfError, WfResult};
use wf_data::{Coords, FarmData, Field, Mask, WakeDeltas, check_per_state, selected_pairs};

use crate::superposition::SuperpositionTable;
use crate::traits::{DistSlicedWakeModel, SlicedDeltas};

/// Targets closer than this behind the rotor see no wake.
pub const X_MIN: f64 = 1e-5;

/// Upper bound of the thrust coefficient inside `sqrt(1 - ct)` terms.
pub const CT_MAX: f64 = 0.9999;

/// Value of `var` at turbine `source[s]`, per state.
pub(crate) fn source_values(fdata: &FarmData, source: &[usize], var: Var) -> WfResult<Vec<f64>> {
    check_per_state("wake source turbines", source, fdata.n_states())?;
    let field = fdata.get(var)?;
    Ok(source
        .iter()
        .enumerate()
        .map(|(s, &t)| field[(s, t)])
        .collect())
}

/// Downstream targets of a thrust-producing source.
pub(crate) fn select_downstream(x: &Field, ct: &[f64]) -> Mask {
    Mask::from_fn(x.nrows(), x.ncols(), |s, t| x[(s, t)] > X_MIN && ct[s] > 0.0)
}

pub(crate) fn check_sliced_input(
    fdata: &FarmData,
    x: &Field,
    yz: &DMatrix<Vector2<f64>>,
    n_yz: usize,
) -> WfResult<()> {
    let n_states = fdata.n_states();
    if x.nrows() != n_states {
        return Err(WfError::dimension(
            "downstream distances",
            (n_states, x.ncols()),
            x.shape(),
        ));
    }
    let expected = (n_states, x.ncols() * n_yz);
    if yz.shape() != expected {
        return Err(WfError::dimension("wake offsets", expected, yz.shape()));
    }
    Ok(())
}

/// Evaluate `profile(state, pair index, x, offset)` on every selected pair.
///
/// Returns one row per selected pair and `n_yz` columns.
pub(crate) fn eval_selected<F>(
    sel: &Mask,
    x: &Field,
    yz: &DMatrix<Vector2<f64>>,
    n_yz: usize,
    mut profile: F,
) -> Field
where
    F: FnMut(usize, f64, Vector2<f64>) -> f64,
{
    let pairs = selected_pairs(sel);
    let mut out = Field::zeros(pairs.len(), n_yz);
    for (k, &(s, t)) in pairs.iter().enumerate() {
        for j in 0..n_yz {
            out[(k, j)] = profile(s, x[(s, t)], yz[(s, t * n_yz + j)]);
        }
    }
    out
}

/// Scatter sliced results into full `(state, target * n_yz)` arrays and
/// superpose them onto `deltas`.
pub fn superpose_sliced(
    model: &str,
    table: &SuperpositionTable,
    fdata: &FarmData,
    source: &[usize],
    sliced: &SlicedDeltas,
    n_yz: usize,
    deltas: &mut WakeDeltas,
) -> WfResult<()> {
    let (n_states, n_targets) = sliced.sel.shape();
    let n_cols = n_targets * n_yz;
    if deltas.shape() != (n_states, n_cols) {
        return Err(WfError::dimension(
            format!("wake deltas of '{model}'"),
            (n_states, n_cols),
            deltas.shape(),
        ));
    }
    let pairs = selected_pairs(&sliced.sel);
    let mask = Mask::from_fn(n_states, n_cols, |s, c| sliced.sel[(s, c / n_yz)]);

    for (&var, values) in &sliced.values {
        if values.shape() != (pairs.len(), n_yz) {
            return Err(WfError::dimension(
                format!("sliced '{var}' deltas of '{model}'"),
                (pairs.len(), n_yz),
                values.shape(),
            ));
        }
        let rule = table.get(model, var)?;
        let mut new = Field::zeros(n_states, n_cols);
        for (k, &(s, t)) in pairs.iter().enumerate() {
            for j in 0..n_yz {
                new[(s, t * n_yz + j)] = values[(k, j)];
            }
        }
        rule.calc_wakes_plus_wake(fdata, source, &mask, var, deltas.get_mut(var)?, &new)?;
    }
    Ok(())
}

/// Point-wise contribution of a distance-sliced model: one offset per target.
pub fn contribute_sliced<M>(
    model: &M,
    fdata: &FarmData,
    source: &[usize],
    wcoos: &Coords,
    deltas: &mut WakeDeltas,
) -> WfResult<()>
where
    M: DistSlicedWakeModel + ?Sized,
{
    let x = Field::from_fn(wcoos.nrows(), wcoos.ncols(), |s, t| wcoos[(s, t)].x);
    let yz = DMatrix::from_fn(wcoos.nrows(), wcoos.ncols(), |s, t| {
        Vector2::new(wcoos[(s, t)].y, wcoos[(s, t)].z)
    });
    let sliced = model.calc_wakes_spsel_x_yz(fdata, source, &x, &yz, 1)?;
    superpose_sliced(
        model.name(),
        model.superposition(),
        fdata,
        source,
        &sliced,
        1,
        deltas,
    )
}

/// Sliced result with a single variable.
pub(crate) fn single_var(sel: Mask, var: Var, values: Field) -> SlicedDeltas {
    let mut map = BTreeMap::new();
    map.insert(var, values);
    SlicedDeltas { sel, values: map }
}
