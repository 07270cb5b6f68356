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

/// Added turbulence of Crespo & Hernández (1996) inside a top-hat wake.
///
/// `dTI = 0.73 a^0.8325 TI0^0.0325 (x/D)^-0.32`, with `a` the axial induction
/// and `TI0` the ambient turbulence at the source rotor.
#[derive(Debug, Clone)]
pub struct CrespoHernandez {
    /// Wake expansion rate of the top-hat region
    pub k: f64,
    superp: SuperpositionTable,
}

impl CrespoHernandez {
    /// Smallest `x / D` used in the power law.
    pub const XD_MIN: f64 = 0.1;

    pub fn new(k: f64, ti_superposition: Arc<dyn Superposition>) -> Self {
        Self {
            k,
            superp: SuperpositionTable::new().with(Var::Ti, ti_superposition),
        }
    }

    pub fn added_ti(ct: f64, ti_amb: f64, x_over_d: f64) -> f64 {
        let a = 0.5 * (1.0 - (1.0 - ct.min(CT_MAX)).sqrt());
        0.73 * a.powf(0.8325) * ti_amb.max(0.0).powf(0.0325)
            * x_over_d.max(Self::XD_MIN).powf(-0.32)
    }
}

impl WakeModel for CrespoHernandez {
    fn name(&self) -> &str {
        "crespo_hernandez"
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

impl DistSlicedWakeModel for CrespoHernandez {
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
        let ti = source_values(fdata, source, Var::AmbTi)?;
        let sel = select_downstream(x, &ct);
        let values = eval_selected(&sel, x, yz, n_yz, |s, x, off| {
            if off.norm() > 0.5 * d[s] + self.k * x {
                0.0
            } else {
                Self::added_ti(ct[s], ti[s], x / d[s])
            }
        });
        Ok(single_var(sel, Var::Ti, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_ti_decreases_downstream() {
        let near = CrespoHernandez::added_ti(0.8, 0.06, 2.0);
        let far = CrespoHernandez::added_ti(0.8, 0.06, 10.0);
        assert!(near > far && far > 0.0);
        // clamped close to the rotor
        assert_eq!(
            CrespoHernandez::added_ti(0.8, 0.06, 0.0),
            CrespoHernandez::added_ti(0.8, 0.06, 0.1)
        );
    }
}
