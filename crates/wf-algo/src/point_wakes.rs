//! Wakes at arbitrary evaluation points.

use std::sync::Arc;

use tracing::trace;
use wf_core::{Var, WfResult};
use wf_data::{FarmData, PointData, VarTable, WakeDeltas};
use wf_models::{WakeFrame, WakeModel};
use wf_states::{PointDataModel, PointDataModelList};

/// Point-target calculation on top of finished farm results.
pub struct PointWakesCalculation<'a> {
    pub wake_frame: &'a dyn WakeFrame,
    pub wake_models: &'a [Arc<dyn WakeModel>],
    /// Variables to report, besides those of the post-processing chain.
    pub pvars: Vec<Var>,
    /// Run after the wakes are applied.
    pub emodels: &'a PointDataModelList,
}

impl PointWakesCalculation<'_> {
    /// Apply all wakes to the ambient values in `pdata`.
    ///
    /// `pdata` must hold the ambient (`AMB_*`) twin of every variable a wake
    /// model touches. On return it holds exactly the output variables.
    pub fn calculate(&self, fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        if !self.wake_models.is_empty() {
            let mut deltas = WakeDeltas::new(pdata.n_states(), pdata.n_points());
            for m in self.wake_models {
                m.init_wake_deltas(fdata, &mut deltas)?;
            }

            for oi in 0..fdata.n_turbines() {
                let o = fdata.order_column(oi)?;
                let wcoos = self.wake_frame.get_wake_coos(fdata, &o, pdata.points())?;
                for m in self.wake_models {
                    m.contribute_to_wake_deltas(fdata, &o, &wcoos, &mut deltas)?;
                }
                trace!(oi, "point wakes step done");
            }

            let mut amb = VarTable::new("ambient point results", pdata.n_states(), pdata.n_points());
            for var in deltas.vars().collect::<Vec<_>>() {
                amb.insert(var, pdata.ambient(var)?.clone())?;
            }
            for m in self.wake_models {
                m.finalize_wake_deltas(fdata, &amb, &mut deltas)?;
            }

            for &var in &self.pvars {
                if deltas.contains(var) {
                    let waked = amb.get(var)? + deltas.get(var)?;
                    pdata.insert(var, waked)?;
                }
            }
        }

        self.emodels.calculate(fdata, pdata)?;

        let mut keep = self.pvars.clone();
        keep.extend(self.emodels.output_point_vars());
        pdata.vars_mut().retain(&keep);
        Ok(())
    }
}
