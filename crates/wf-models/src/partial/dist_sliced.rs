use std::sync::Arc;

use nalgebra::{DMatrix, Vector2};
use tracing::debug;
use wf_core::WfResult;
use wf_data::{Coords, FarmData, Field, ModelData, WakeDeltas};

use super::{add_deltas, finalize_all, rotor_effective_ambient, target_points};
use crate::rotor::{GridRotor, rotor_points};
use crate::traits::{PartialWakesModel, RotorModel, WakeContext, WakeModel, require_dist_sliced};
use crate::wake::superpose_sliced;

/// Partial wakes for distance-sliced wake models.
///
/// Wakes are evaluated at the downstream distance of each rotor centre and
/// at the lateral/vertical offsets of an `n x n` grid on the rotor disk (or
/// the primary rotor's own points when no grid is given). The rotor-averaged
/// ambient inflow plus the grid-averaged deltas form a single waked value per
/// turbine.
#[derive(Debug, Clone)]
pub struct PartialDistSliced {
    name: String,
    grid: Option<GridRotor>,
}

impl PartialDistSliced {
    pub fn new(n: Option<usize>) -> WfResult<Self> {
        let (name, grid) = match n {
            Some(n) => (format!("dist_sliced_grid{}", n * n), Some(GridRotor::new(n)?)),
            None => ("dist_sliced".to_string(), None),
        };
        Ok(Self { name, grid })
    }

    fn eval_weights(&self, mdata: &ModelData) -> WfResult<Vec<f64>> {
        match &self.grid {
            Some(g) => Ok(g.rotor_point_weights().to_vec()),
            None => Ok(mdata.rotor()?.weights.clone()),
        }
    }

    /// Evaluation points of every turbine, shape `(state, turbine * n_eval)`.
    fn eval_points<'m>(&self, fdata: &FarmData, mdata: &'m mut ModelData) -> WfResult<&'m Coords> {
        match &self.grid {
            Some(g) => mdata.cached_coords(&self.name, || {
                debug!(
                    model = %self.name,
                    n_points = g.n_rotor_points(),
                    "placing partial-wakes grid"
                );
                rotor_points(fdata, g.design_points())
            }),
            None => Ok(&mdata.rotor()?.points),
        }
    }
}

impl PartialWakesModel for PartialDistSliced {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_wake_models(&self, wake_models: &[Arc<dyn WakeModel>]) -> WfResult<()> {
        for model in wake_models {
            require_dist_sliced(&self.name, model.as_ref())?;
        }
        Ok(())
    }

    fn new_wake_deltas(
        &self,
        ctx: &WakeContext<'_>,
        fdata: &FarmData,
        mdata: &mut ModelData,
    ) -> WfResult<WakeDeltas> {
        let n_cols = self.eval_points(fdata, mdata)?.ncols();
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
        let n_t = fdata.n_turbines();
        let centres = ctx.wake_frame.get_wake_coos(fdata, source, fdata.txyh())?;
        let x = Field::from_fn(centres.nrows(), n_t, |s, t| centres[(s, t)].x);

        let points = self.eval_points(fdata, mdata)?;
        let n_eval = points.ncols() / n_t.max(1);
        let wpoints = ctx.wake_frame.get_wake_coos(fdata, source, points)?;
        let yz = DMatrix::from_fn(wpoints.nrows(), wpoints.ncols(), |s, c| {
            Vector2::new(wpoints[(s, c)].y, wpoints[(s, c)].z)
        });

        for model in ctx.wake_models {
            let sliced_model = require_dist_sliced(&self.name, model.as_ref())?;
            let sliced = sliced_model.calc_wakes_spsel_x_yz(fdata, source, &x, &yz, n_eval)?;
            superpose_sliced(
                model.name(),
                model.superposition(),
                fdata,
                source,
                &sliced,
                n_eval,
                deltas,
            )?;
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
        let weights = self.eval_weights(mdata)?;
        let n_eval = weights.len();
        let rpoints = mdata.rotor()?;
        let amb_rp = target_points(&rpoints.amb_results, targets, rpoints.n_rpoints())?;
        let amb = rotor_effective_ambient(&amb_rp, &rpoints.weights, n_eval)?;

        let mut tdeltas = deltas.extract_targets(targets, n_eval)?;
        finalize_all(ctx, fdata, &amb, &mut tdeltas)?;
        let wres_points = add_deltas(&amb, &tdeltas)?;

        let mut wres = wf_data::VarTable::new("waked rotor", fdata.n_states(), 1);
        for (var, field) in wres_points.iter() {
            let mean = Field::from_fn(field.nrows(), 1, |s, _| {
                (0..n_eval).map(|p| weights[p] * field[(s, p)]).sum()
            });
            wres.insert(var, mean)?;
        }
        ctx.rotor.eval_rpoint_results(fdata, &wres, &[1.0], Some(targets))
    }
}
