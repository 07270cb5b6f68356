use wf_core::WfResult;
use wf_data::{FarmData, ModelData, WakeDeltas};

use super::{add_deltas, finalize_all, target_points};
use crate::traits::{PartialWakesModel, WakeContext};

/// Evaluate wakes directly at the rotor points of the primary rotor.
///
/// Works with any wake model. Each rotor point is finalized against its
/// own ambient values before the rotor aggregates them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotorPoints;

impl PartialWakesModel for RotorPoints {
    fn name(&self) -> &str {
        "rotor_points"
    }

    fn new_wake_deltas(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &FarmData,
        mdata: &mut ModelData,
    ) -> WfResult<WakeDeltas> {
        let n_cols = mdata.rotor()?.points.ncols();
        let mut deltas = WakeDeltas::new(fdata.n_states(), n_cols);
        for model in ctx.wake_models {
            model.init_wake_deltas(fdata, &mut deltas)?;
        }
        Ok(deltas)
    }

    fn contribute_to_wake_deltas(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &FarmData,
        mdata: &mut ModelData,
        source: &[usize],
        deltas: &mut WakeDeltas,
    ) -> WfResult<()> {
        let points = &mdata.rotor()?.points;
        let wcoos = ctx.wake_frame.get_wake_coos(fdata, source, points)?;
        for model in ctx.wake_models {
            model.contribute_to_wake_deltas(fdata, source, &wcoos, deltas)?;
        }
        Ok(())
    }

    fn evaluate_results(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &mut FarmData,
        mdata: &mut ModelData,
        deltas: &WakeDeltas,
        targets: &[usize],
    ) -> WfResult<()> {
        let rpoints = mdata.rotor()?;
        let n_rp = rpoints.n_rpoints();
        let weights = rpoints.weights.clone();
        let amb = target_points(&rpoints.amb_results, targets, n_rp)?;

        let mut tdeltas = deltas.extract_targets(targets, n_rp)?;
        finalize_all(ctx, fdata, &amb, &mut tdeltas)?;
        let wres = add_deltas(&amb, &tdeltas)?;
        ctx.rotor
            .eval_rpoint_results(fdata, &wres, &weights, Some(targets))
    }
}
