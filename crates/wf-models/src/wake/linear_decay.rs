use std::sync::Arc;

use nalgebra::{DMatrix, Vector2};
use wf_core::{Var, WfResult};
use wf_data::{Coords, FarmData, Field, WakeDeltas};

use super::{
    check_sliced_input, contribute_sliced, eval_selected, select_downstream, single_var,
    source_values,
};
use crate::superposition::SuperpositionTable;
use crate::traits::{DistSlicedWakeModel, SlicedDeltas, Superposition, WakeModel};

/// Cylindrical wake whose relative deficit decays linearly to zero.
///
/// Inside `radius_factor * D / 2` the relative deficit is
/// `deficit * (1 - x / length)` for `x < length`, zero beyond.
#[derive(Debug, Clone)]
pub struct LinearDecay {
    pub deficit: f64,
    /// Downstream distance at which the wake vanishes (m)
    pub length: f64,
    pub radius_factor: f64,
    superp: SuperpositionTable,
}

impl LinearDecay {
    pub fn new(deficit: f64, length: f64, ws_superposition: Arc<dyn Superposition>) -> Self {
        Self {
            deficit,
            length,
            radius_factor: 1.0,
            superp: SuperpositionTable::new().with(Var::Ws, ws_superposition),
        }
    }

    pub fn with_radius_factor(mut self, f: f64) -> Self {
        self.radius_factor = f;
        self
    }

    /// Relative centreline deficit at downstream distance `x`.
    pub fn relative_deficit(&self, x: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        self.deficit * (1.0 - x / self.length).max(0.0)
    }
}

impl WakeModel for LinearDecay {
    fn name(&self) -> &str {
        "linear_decay"
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

impl DistSlicedWakeModel for LinearDecay {
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
        let values = eval_selected(&sel, x, yz, n_yz, |s, x, off| {
            if off.norm() > 0.5 * self.radius_factor * d[s] {
                0.0
            } else {
                -self.relative_deficit(x)
            }
        });
        Ok(single_var(sel, Var::Ws, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::superposition::WsLinear;

    #[test]
    fn deficit_vanishes_at_length() {
        let m = LinearDecay::new(0.4, 1000.0, Arc::new(WsLinear::new(false)));
        assert!((m.relative_deficit(0.0) - 0.4).abs() < 1e-15);
        assert!((m.relative_deficit(250.0) - 0.3).abs() < 1e-15);
        assert_eq!(m.relative_deficit(1000.0), 0.0);
        assert_eq!(m.relative_deficit(5000.0), 0.0);
    }
}
