use std::sync::Arc;

use nalgebra::{DMatrix, Vector2};
use wf_core::{Var, WfResult};
use wf_data::{Coords, FarmData, Field, WakeDeltas};

use super::{
    CT_MAX, check_sliced_input, contribute_sliced, eval_selected, select_downstream, single_var,
    source_values,
};
use crate::superposition::SuperpositionTable;
use crate::traits::{DistSlicedWakeModel, SlicedDeltas, Superposition, WakeModel};

/// Top-hat wake with linear expansion.
///
/// Relative deficit `(1 - sqrt(1 - ct)) * (R / (R + k x))^2` inside the wake
/// radius `R + k x`, zero outside, where `R` is the rotor radius.
#[derive(Debug, Clone)]
pub struct Jensen {
    /// Wake expansion rate
    pub k: f64,
    superp: SuperpositionTable,
}

impl Jensen {
    pub fn new(k: f64, ws_superposition: Arc<dyn Superposition>) -> Self {
        Self {
            k,
            superp: SuperpositionTable::new().with(Var::Ws, ws_superposition),
        }
    }
}

impl WakeModel for Jensen {
    fn name(&self) -> &str {
        "jensen"
    }

    fn superposition(&self) -> &SuperpositionTable {
        &self.superp
    }

    fn contribute_to_wake_deltas(
        &self,
        fdata: &FarmData,
        source: &[usize],
        wcoos: &Coords,
        deltas: &mut WakeDeltas,
    ) -> WfResult<()> {
        contribute_sliced(self, fdata, source, wcoos, deltas)
    }

    fn as_dist_sliced(&self) -> Option<&dyn DistSlicedWakeModel> {
        Some(self)
    }
}

impl DistSlicedWakeModel for Jensen {
    fn calc_wakes_spsel_x_yz(
        &self,
        fdata: &FarmData,
        source: &[usize],
        x: &Field,
        yz: &DMatrix<Vector2<f64>>,
        n_yz: usize,
    ) -> WfResult<SlicedDeltas> {
        check_sliced_input(fdata, x, yz, n_yz)?;
        let ct = source_values(fdata, source, Var::Ct)?;
        let d = source_values(fdata, source, Var::D)?;
        let sel = select_downstream(x, &ct);
        let k = self.k;
        let values = eval_selected(&sel, x, yz, n_yz, |s, x, off| {
            let r0 = 0.5 * d[s];
            let rw = r0 + k * x;
            if off.norm() > rw {
                return 0.0;
            }
            let a = 1.0 - (1.0 - ct[s].min(CT_MAX)).sqrt();
            -a * (r0 / rw).powi(2)
        });
        Ok(single_var(sel, Var::Ws, values))
    }
}
