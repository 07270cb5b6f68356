//! Wake delta accumulator.

use std::collections::{BTreeMap, BTreeSet};

use wf_core::{Var, WfError, WfResult};

use crate::select::target_columns;
use crate::table::Field;

/// Accumulated wake deltas per variable, shape `(state, target)`.
///
/// Created once per calculation pass and threaded by `&mut` through every
/// step of the turbine order loop. The closing transform of a variable is
/// applied at most once, see [`WakeDeltas::finalize_var`].
#[derive(Debug, Clone, PartialEq)]
pub struct WakeDeltas {
    n_states: usize,
    n_targets: usize,
    deltas: BTreeMap<Var, Field>,
    finalized: BTreeSet<Var>,
}

impl WakeDeltas {
    pub fn new(n_states: usize, n_targets: usize) -> Self {
        Self {
            n_states,
            n_targets,
            deltas: BTreeMap::new(),
            finalized: BTreeSet::new(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_states, self.n_targets)
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    /// Register `var` with a zeroed accumulator; no-op if present.
    pub fn init_var(&mut self, var: Var) {
        let (rows, cols) = self.shape();
        self.deltas
            .entry(var)
            .or_insert_with(|| Field::zeros(rows, cols));
    }

    pub fn contains(&self, var: Var) -> bool {
        self.deltas.contains_key(&var)
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.deltas.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn get(&self, var: Var) -> WfResult<&Field> {
        self.deltas
            .get(&var)
            .ok_or_else(|| WfError::missing_data(var, "wake deltas", self.deltas.keys()))
    }

    pub fn get_mut(&mut self, var: Var) -> WfResult<&mut Field> {
        if !self.deltas.contains_key(&var) {
            return Err(WfError::missing_data(var, "wake deltas", self.deltas.keys()));
        }
        self.deltas
            .get_mut(&var)
            .ok_or_else(|| WfError::missing_data(var, "wake deltas", std::iter::empty::<Var>()))
    }

    /// Apply the closing transform of `var` once.
    ///
    /// Returns `Ok(false)` if `var` was already finalized, in which case `f`
    /// is not called. Several wake models may share one variable; only the
    /// first finalization takes effect.
    pub fn finalize_var<F>(&mut self, var: Var, f: F) -> WfResult<bool>
    where
        F: FnOnce(&mut Field) -> WfResult<()>,
    {
        if self.finalized.contains(&var) {
            return Ok(false);
        }
        f(self.get_mut(var)?)?;
        self.finalized.insert(var);
        Ok(true)
    }

    /// Copy out the columns belonging to one target per state.
    ///
    /// The accumulator holds `n_per_target` consecutive columns per target
    /// (e.g. rotor points per turbine); row `s` of the result is the block of
    /// target `targets[s]`. The copy starts unfinalized.
    pub fn extract_targets(&self, targets: &[usize], n_per_target: usize) -> WfResult<WakeDeltas> {
        if targets.len() != self.n_states {
            return Err(WfError::dimension(
                "target selection",
                (self.n_states, 1),
                (targets.len(), 1),
            ));
        }
        let mut out = WakeDeltas::new(self.n_states, n_per_target);
        for (&var, field) in &self.deltas {
            let mut sel = Field::zeros(self.n_states, n_per_target);
            for (s, &t) in targets.iter().enumerate() {
                let cols = target_columns(t, n_per_target);
                if cols.end > self.n_targets {
                    return Err(WfError::IndexOob {
                        what: "wake delta target",
                        index: t,
                        len: self.n_targets / n_per_target.max(1),
                    });
                }
                for (p, c) in cols.enumerate() {
                    sel[(s, p)] = field[(s, c)];
                }
            }
            out.deltas.insert(var, sel);
        }
        Ok(out)
    }
}
