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

/// Gaussian wake of Bastankhah & Porté-Agel (2014).
#[derive(Debug, Clone)]
pub struct Bastankhah2014 {
    /// Wake growth rate
    pub k: f64,
    /// Initial width factor, multiplies `sqrt(beta)`
    pub sbeta_factor: f64,
    superp: SuperpositionTable,
}

impl Bastankhah2014 {
    pub fn new(k: f64, ws_superposition: Arc<dyn Superposition>) -> Self {
        Self {
            k,
            sbeta_factor: 0.2,
            superp: SuperpositionTable::new().with(Var::Ws, ws_superposition),
        }
    }

    pub fn with_sbeta_factor(mut self, f: f64) -> Self {
        self.sbeta_factor = f;
        self
    }

    /// Wake width over rotor diameter at downstream distance `x`.
    pub fn sigma_over_d(&self, ct: f64, x: f64, d: f64) -> f64 {
        let sq = (1.0 - ct.min(CT_MAX)).sqrt();
        let beta = 0.5 * (1.0 + sq) / sq;
        self.k * x / d + self.sbeta_factor * beta.sqrt()
    }
}

impl WakeModel for Bastankhah2014 {
    fn name(&self) -> &str {
        "bastankhah2014"
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

impl DistSlicedWakeModel for Bastankhah2014 {
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
            let ct = ct[s].min(CT_MAX);
            let sod = self.sigma_over_d(ct, x, d[s]);
            // Clamped in the near wake: full centreline deficit.
            let radicand = 1.0 - ct / (8.0 * sod * sod);
            let sigma = sod * d[s];
            let amp = 1.0 - radicand.max(0.0).sqrt();
            -amp * (-0.5 * off.norm_squared() / (sigma * sigma)).exp()
        });
        Ok(single_var(sel, Var::Ws, values))
    }
}
