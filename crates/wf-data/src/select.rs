//! Selection helpers over the `(state, target)` axes.

use nalgebra::Vector3;
use wf_core::{WfError, WfResult};

use crate::table::{Coords, Mask};

/// `(state, target)` pairs where `mask` is set, state-major.
pub fn selected_pairs(mask: &Mask) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for s in 0..mask.nrows() {
        for t in 0..mask.ncols() {
            if mask[(s, t)] {
                out.push((s, t));
            }
        }
    }
    out
}

/// Column range of target `target` when every target owns `n_per_target` columns.
#[inline]
pub fn target_columns(target: usize, n_per_target: usize) -> std::ops::Range<usize> {
    target * n_per_target..(target + 1) * n_per_target
}

/// Repeat one point set for every state.
pub fn broadcast_points(n_states: usize, points: &[Vector3<f64>]) -> Coords {
    Coords::from_fn(n_states, points.len(), |_, p| points[p])
}

/// Check that a per-state index vector covers `n_states` states.
pub fn check_per_state(what: &str, values: &[usize], n_states: usize) -> WfResult<()> {
    if values.len() != n_states {
        return Err(WfError::dimension(
            what.to_string(),
            (n_states, 1),
            (values.len(), 1),
        ));
    }
    Ok(())
}
