//! Point post-processing models.

use wf_core::{Var, WfError, WfResult};
use wf_data::{FarmData, Field, PointData};

use crate::traits::PointDataModel;

/// Vertical power-law profile: `WS *= (z / ref_height)^alpha`.
///
/// Points at or below the ground get zero wind speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawShear {
    pub ref_height: f64,
    pub alpha: f64,
}

impl PowerLawShear {
    pub fn new(ref_height: f64, alpha: f64) -> WfResult<Self> {
        if ref_height.is_nan() || ref_height <= 0.0 {
            return Err(WfError::InvalidArg {
                what: format!("shear reference height must be positive, got {ref_height}"),
            });
        }
        Ok(Self { ref_height, alpha })
    }

    pub fn factor(&self, z: f64) -> f64 {
        if z <= 0.0 {
            0.0
        } else {
            (z / self.ref_height).powf(self.alpha)
        }
    }
}

impl PointDataModel for PowerLawShear {
    fn name(&self) -> &str {
        "power_law_shear"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        vec![Var::Ws]
    }

    fn calculate(&self, _fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        let z = Field::from_fn(pdata.n_states(), pdata.n_points(), |s, p| {
            self.factor(pdata.points()[(s, p)].z)
        });
        let ws = pdata.get_mut(Var::Ws)?;
        ws.component_mul_assign(&z);
        Ok(())
    }
}

/// Wind power density `WPD = RHO * WS^3 / 2` (W/m2).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerDensity;

impl PointDataModel for PowerDensity {
    fn name(&self) -> &str {
        "power_density"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        vec![Var::Wpd]
    }

    fn calculate(&self, _fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        let ws = pdata.get(Var::Ws)?;
        let rho = pdata.get(Var::Rho)?;
        let wpd = ws.zip_map(rho, |w, r| 0.5 * r * w * w * w);
        pdata.insert(Var::Wpd, wpd)
    }
}
