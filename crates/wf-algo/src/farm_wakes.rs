//! Wake propagation between the turbines of one chunk.

use std::sync::Arc;

use tracing::trace;
use wf_core::{WfError, WfResult};
use wf_data::{FarmData, ModelData};
use wf_models::{PartialWakesModel, TurbineType, WakeContext};

/// Run the turbine types of turbine `t` on the pairs `(s, t)`.
///
/// Pairs are grouped by turbine type, so each type is evaluated once.
pub(crate) fn run_turbine_types(
    fdata: &mut FarmData,
    turbine_types: &[Arc<dyn TurbineType>],
    pairs: &[(usize, usize)],
) -> WfResult<()> {
    let type_ptr = |t: usize| Arc::as_ptr(&turbine_types[t]) as *const ();
    // Representative turbine of each type, with the pairs of that type.
    let mut groups: Vec<(usize, Vec<(usize, usize)>)> = Vec::new();
    for &(s, t) in pairs {
        if t >= turbine_types.len() {
            return Err(WfError::IndexOob {
                what: "turbine type",
                index: t,
                len: turbine_types.len(),
            });
        }
        match groups.iter_mut().find(|g| type_ptr(g.0) == type_ptr(t)) {
            Some(g) => g.1.push((s, t)),
            None => groups.push((t, vec![(s, t)])),
        }
    }
    for (t, group) in groups {
        turbine_types[t].calculate(fdata, &group)?;
    }
    Ok(())
}

/// The turbine-target calculation of one chunk.
///
/// Walks the downwind order: each turbine first receives the wakes of all
/// turbines before it, has its turbine type re-evaluated, and only then
/// emits its own wake.
pub struct FarmWakesCalculation<'a> {
    pub ctx: WakeContext<'a>,
    pub partial_wakes: &'a dyn PartialWakesModel,
    /// Turbine type of every turbine, by turbine index.
    pub turbine_types: &'a [Arc<dyn TurbineType>],
}

impl FarmWakesCalculation<'_> {
    /// Update the waked variables of `fdata` in place.
    ///
    /// Requires ambient results, rotor data in `mdata` and the downwind order.
    pub fn calculate(&self, fdata: &mut FarmData, mdata: &mut ModelData) -> WfResult<()> {
        if self.ctx.wake_models.is_empty() {
            return Ok(());
        }
        let pw = self.partial_wakes;
        let n_turbines = fdata.n_turbines();
        let mut deltas = pw.new_wake_deltas(&self.ctx, fdata, mdata)?;

        for oi in 0..n_turbines {
            let o = fdata.order_column(oi)?;
            if oi > 0 {
                pw.evaluate_results(&self.ctx, fdata, mdata, &deltas, &o)?;
                let pairs: Vec<(usize, usize)> = o.iter().copied().enumerate().collect();
                run_turbine_types(fdata, self.turbine_types, &pairs)?;
            }
            if oi + 1 < n_turbines {
                pw.contribute_to_wake_deltas(&self.ctx, fdata, mdata, &o, &mut deltas)?;
            }
            trace!(oi, "order step done");
        }
        Ok(())
    }
}
