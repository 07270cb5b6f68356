//! Contracts for the pluggable models.
//!
//! Every model is configuration-only: it is built once, shared by reference
//! between chunks (hence `Send + Sync`) and never mutated during a
//! calculation pass. Anything a model derives per chunk lives in
//! [`ModelData`].

use std::collections::BTreeMap;
use std::sync::Arc;

use nalgebra::{DMatrix, Vector2};
use wf_core::units::Length;
use wf_core::{Var, WfError, WfResult};
use wf_data::{Coords, FarmData, Field, Mask, ModelData, VarTable, WakeDeltas};

use crate::rotor;
use crate::superposition::SuperpositionTable;

/// Expresses target points in the wake-local frame of a source turbine.
pub trait WakeFrame: Send + Sync {
    fn name(&self) -> &str;

    /// Downwind processing order, shape `(state, turbine)`.
    fn calc_order(&self, fdata: &FarmData) -> WfResult<DMatrix<usize>>;

    /// Wake coordinates of `targets` relative to turbine `source[s]` in every state `s`.
    ///
    /// Returns `(downstream, lateral, vertical)` per target, same shape as `targets`.
    fn get_wake_coos(&self, fdata: &FarmData, source: &[usize], targets: &Coords)
    -> WfResult<Coords>;
}

/// Combination law for overlapping wakes of one variable.
pub trait Superposition: Send + Sync {
    fn name(&self) -> &str;

    /// Combine `new` into `running` where `sel` is set.
    ///
    /// `source` is the emitting turbine per state; rules that scale relative
    /// deficits read its rotor results from `fdata`.
    fn calc_wakes_plus_wake(
        &self,
        fdata: &FarmData,
        source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()>;

    /// Closing transform of the accumulated delta, given ambient reference values.
    fn calc_final_wake_delta(&self, var: Var, amb: &Field, delta: &mut Field) -> WfResult<()>;
}

/// Wake deficits of one source turbine, evaluated on a selection only.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicedDeltas {
    /// `(state, target)` pairs inside the model's region of influence.
    pub sel: Mask,
    /// Per variable: one row per selected pair (state-major), one column per
    /// lateral/vertical offset of that target.
    pub values: BTreeMap<Var, Field>,
}

/// A wake physics model.
pub trait WakeModel: Send + Sync {
    fn name(&self) -> &str;

    /// Variables this model contributes to and their superposition rules.
    fn superposition(&self) -> &SuperpositionTable;

    /// Register zeroed accumulators for every variable of this model.
    fn init_wake_deltas(&self, _fdata: &FarmData, deltas: &mut WakeDeltas) -> WfResult<()> {
        for var in self.superposition().vars() {
            deltas.init_var(var);
        }
        Ok(())
    }

    /// Add the wake of turbine `source[s]` at the wake coordinates `wcoos`.
    fn contribute_to_wake_deltas(
        &self,
        fdata: &FarmData,
        source: &[usize],
        wcoos: &Coords,
        deltas: &mut WakeDeltas,
    ) -> WfResult<()>;

    /// Apply each variable's closing transform given ambient reference values.
    ///
    /// `amb_results` must hold every variable present in `deltas`.
    fn finalize_wake_deltas(
        &self,
        _fdata: &FarmData,
        amb_results: &VarTable,
        deltas: &mut WakeDeltas,
    ) -> WfResult<()> {
        for (var, rule) in self.superposition().iter() {
            if !deltas.contains(var) {
                continue;
            }
            let amb = amb_results.get(var)?;
            deltas.finalize_var(var, |d| rule.calc_final_wake_delta(var, amb, d))?;
        }
        Ok(())
    }

    /// The distance-sliced view of this model, if it offers one.
    fn as_dist_sliced(&self) -> Option<&dyn DistSlicedWakeModel> {
        None
    }
}

/// A wake model whose deficit is a function of downstream distance plus a
/// lateral/vertical offset.
pub trait DistSlicedWakeModel: WakeModel {
    /// Evaluate the wake of `source[s]`.
    ///
    /// `x` is the downstream distance to each target, shape `(state, target)`;
    /// `yz` holds `n_yz` consecutive offsets per target, shape
    /// `(state, target * n_yz)`.
    fn calc_wakes_spsel_x_yz(
        &self,
        fdata: &FarmData,
        source: &[usize],
        x: &Field,
        yz: &DMatrix<Vector2<f64>>,
        n_yz: usize,
    ) -> WfResult<SlicedDeltas>;
}

/// Rotor disk sampling and aggregation.
pub trait RotorModel: Send + Sync {
    fn name(&self) -> &str;

    /// Sample points in rotor-plane units of the rotor radius, `(lateral, vertical)`.
    fn design_points(&self) -> &[Vector2<f64>];

    /// Integration weights, one per design point, summing to 1.
    fn rotor_point_weights(&self) -> &[f64];

    fn n_rotor_points(&self) -> usize {
        self.design_points().len()
    }

    /// Rotor points of every turbine, shape `(state, turbine * n_rotor_points)`.
    fn get_rotor_points(&self, fdata: &FarmData) -> WfResult<Coords> {
        rotor::rotor_points(fdata, self.design_points())
    }

    /// Aggregate per-point results into one value per turbine and state.
    ///
    /// With `targets == None`, `results` covers every turbine, shape
    /// `(state, turbine * n)`; otherwise it covers turbine `targets[s]` only,
    /// shape `(state, n)`, where `n == weights.len()`.
    fn eval_rpoint_results(
        &self,
        fdata: &mut FarmData,
        results: &VarTable,
        weights: &[f64],
        targets: Option<&[usize]>,
    ) -> WfResult<()> {
        rotor::aggregate_rpoint_results(fdata, results, weights, targets)
    }
}

/// Everything a partial-wakes strategy reads from the driver.
#[derive(Clone, Copy)]
pub struct WakeContext<'a> {
    pub wake_frame: &'a dyn WakeFrame,
    pub wake_models: &'a [Arc<dyn WakeModel>],
    pub rotor: &'a dyn RotorModel,
}

/// Integrates a turbine's incoming wake over its rotor disk.
pub trait PartialWakesModel: Send + Sync {
    fn name(&self) -> &str;

    /// Reject incompatible wake models before any calculation starts.
    fn check_wake_models(&self, _wake_models: &[Arc<dyn WakeModel>]) -> WfResult<()> {
        Ok(())
    }

    /// Zeroed accumulator covering every turbine's evaluation points.
    fn new_wake_deltas(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &FarmData,
        mdata: &mut ModelData,
    ) -> WfResult<WakeDeltas>;

    /// Add the wakes of turbine `source[s]` to the accumulator.
    fn contribute_to_wake_deltas(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &FarmData,
        mdata: &mut ModelData,
        source: &[usize],
        deltas: &mut WakeDeltas,
    ) -> WfResult<()>;

    /// Write the waked rotor results of turbine `targets[s]` into `fdata`.
    fn evaluate_results(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &mut FarmData,
        mdata: &mut ModelData,
        deltas: &WakeDeltas,
        targets: &[usize],
    ) -> WfResult<()>;
}

/// Power and thrust of a turbine type.
pub trait TurbineType: Send + Sync {
    fn name(&self) -> &str;

    fn diameter(&self) -> Length;

    fn hub_height(&self) -> Length;

    /// Write `CT` and `P` for the given `(state, turbine)` pairs from `REWS` and `RHO`.
    fn calculate(&self, fdata: &mut FarmData, pairs: &[(usize, usize)]) -> WfResult<()>;
}

/// Error for a wake model used where the distance-sliced contract is required.
pub fn require_dist_sliced<'a>(
    owner: &str,
    model: &'a dyn WakeModel,
) -> WfResult<&'a dyn DistSlicedWakeModel> {
    model.as_dist_sliced().ok_or_else(|| {
        WfError::configuration(
            owner,
            format!(
                "cannot be applied to wake model '{}', since it is not distance-sliced",
                model.name()
            ),
        )
    })
}
