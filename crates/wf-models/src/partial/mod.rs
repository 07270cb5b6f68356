//! Partial-wakes strategies.

mod dist_sliced;
mod rotor_points;

pub use dist_sliced::PartialDistSliced;
pub use rotor_points::RotorPoints;

use wf_core::{Var, WfError, WfResult, uv2wd, vector_mean};
use wf_data::{FarmData, Field, VarTable, WakeDeltas, target_columns};

use crate::traits::WakeContext;

/// Columns of turbine `targets[s]` per state, `n` consecutive columns per turbine.
pub(crate) fn target_points(amb: &VarTable, targets: &[usize], n: usize) -> WfResult<VarTable> {
    let (n_states, n_cols) = amb.shape();
    if targets.len() != n_states {
        return Err(WfError::dimension(
            "target turbines",
            (n_states, 1),
            (targets.len(), 1),
        ));
    }
    let mut out = VarTable::new("target rotor points", n_states, n);
    for (var, field) in amb.iter() {
        let mut sel = Field::zeros(n_states, n);
        for (s, &t) in targets.iter().enumerate() {
            let cols = target_columns(t, n);
            if cols.end > n_cols {
                return Err(WfError::IndexOob {
                    what: "target turbine",
                    index: t,
                    len: n_cols / n.max(1),
                });
            }
            for (p, c) in cols.enumerate() {
                sel[(s, p)] = field[(s, c)];
            }
        }
        out.insert(var, sel)?;
    }
    Ok(out)
}

/// Rotor-effective ambient values of each target, broadcast to `n_eval` columns.
///
/// `WS` and `WD` are vector-averaged over the rotor points with `weights`;
/// other variables are weighted means.
pub(crate) fn rotor_effective_ambient(
    amb_points: &VarTable,
    weights: &[f64],
    n_eval: usize,
) -> WfResult<VarTable> {
    let (n_states, n_rp) = amb_points.shape();
    if weights.len() != n_rp {
        return Err(WfError::dimension(
            "rotor point weights",
            (1, n_rp),
            (1, weights.len()),
        ));
    }
    let has_ws = amb_points.contains(Var::Ws);
    let has_wd = amb_points.contains(Var::Wd);
    if has_ws != has_wd {
        let var = if has_ws { Var::Wd } else { Var::Ws };
        return Err(WfError::missing_data(
            var,
            "ambient rotor results, WS and WD are averaged together",
            amb_points.vars(),
        ));
    }

    let mut out = VarTable::new("rotor effective ambient", n_states, n_eval);
    if has_ws {
        let ws = amb_points.get(Var::Ws)?;
        let wd = amb_points.get(Var::Wd)?;
        let mut ws_eff = Field::zeros(n_states, n_eval);
        let mut wd_eff = Field::zeros(n_states, n_eval);
        for s in 0..n_states {
            let ws_row: Vec<f64> = ws.row(s).iter().copied().collect();
            let wd_row: Vec<f64> = wd.row(s).iter().copied().collect();
            let (mws, mwd) = if n_rp == 1 {
                (ws_row[0], wd_row[0])
            } else {
                let (u, v) = vector_mean(&wd_row, &ws_row, weights);
                (u.hypot(v), uv2wd(u, v))
            };
            ws_eff.row_mut(s).fill(mws);
            wd_eff.row_mut(s).fill(mwd);
        }
        out.insert(Var::Ws, ws_eff)?;
        out.insert(Var::Wd, wd_eff)?;
    }
    for (var, field) in amb_points.iter() {
        if matches!(var, Var::Ws | Var::Wd) {
            continue;
        }
        let mut eff = Field::zeros(n_states, n_eval);
        for s in 0..n_states {
            let m: f64 = (0..n_rp).map(|p| weights[p] * field[(s, p)]).sum();
            eff.row_mut(s).fill(m);
        }
        out.insert(var, eff)?;
    }
    Ok(out)
}

/// Run the closing transform of every wake model on target deltas.
pub(crate) fn finalize_all(
    ctx: &WakeContext<'_>,
    fdata: &FarmData,
    amb: &VarTable,
    deltas: &mut WakeDeltas,
) -> WfResult<()> {
    for model in ctx.wake_models {
        model.finalize_wake_deltas(fdata, amb, deltas)?;
    }
    Ok(())
}

/// `amb + delta` for every ambient variable, deltas where present.
pub(crate) fn add_deltas(amb: &VarTable, deltas: &WakeDeltas) -> WfResult<VarTable> {
    let (rows, cols) = amb.shape();
    let mut out = VarTable::new("waked rotor points", rows, cols);
    for (var, field) in amb.iter() {
        let mut v = field.clone();
        if deltas.contains(var) {
            v += deltas.get(var)?;
        }
        out.insert(var, v)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_points_take_the_turbine_block() {
        let mut amb = VarTable::new("rotor points", 2, 6);
        amb.insert(Var::Ws, Field::from_fn(2, 6, |s, c| (10 * s + c) as f64))
            .unwrap();
        let out = target_points(&amb, &[2, 0], 2).unwrap();
        let ws = out.get(Var::Ws).unwrap();
        assert_eq!(ws.shape(), (2, 2));
        assert_eq!((ws[(0, 0)], ws[(0, 1)]), (4.0, 5.0));
        assert_eq!((ws[(1, 0)], ws[(1, 1)]), (10.0, 11.0));
        assert!(matches!(
            target_points(&amb, &[3, 0], 2),
            Err(WfError::IndexOob { index: 3, .. })
        ));
    }
}
