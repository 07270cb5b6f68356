//! Wake frames.

use nalgebra::{DMatrix, Vector3};
use wf_core::{Var, WfResult, wd2uv};
use wf_data::{Coords, FarmData, check_per_state};

use crate::order::downwind_order;
use crate::traits::WakeFrame;

/// Straight wakes along the wind direction at the emitting rotor.
///
/// Uses the waked `WD` of the source turbine when known, its ambient
/// direction otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotorWd;

impl WakeFrame for RotorWd {
    fn name(&self) -> &str {
        "rotor_wd"
    }

    fn calc_order(&self, fdata: &FarmData) -> WfResult<DMatrix<usize>> {
        downwind_order(fdata)
    }

    fn get_wake_coos(
        &self,
        fdata: &FarmData,
        source: &[usize],
        targets: &Coords,
    ) -> WfResult<Coords> {
        let n_states = fdata.n_states();
        check_per_state("wake source turbines", source, n_states)?;
        if targets.nrows() != n_states {
            return Err(wf_core::WfError::dimension(
                "wake target points",
                (n_states, targets.ncols()),
                targets.shape(),
            ));
        }
        let wd = if fdata.contains(Var::Wd) {
            fdata.get(Var::Wd)?
        } else {
            fdata.get(Var::AmbWd)?
        };

        let mut out = Coords::from_element(n_states, targets.ncols(), Vector3::zeros());
        for (s, &t) in source.iter().enumerate() {
            let hub = fdata.hub(s, t);
            let (nx, ny) = wd2uv(wd[(s, t)], 1.0);
            for p in 0..targets.ncols() {
                let d = targets[(s, p)] - hub;
                out[(s, p)] = Vector3::new(d.x * nx + d.y * ny, d.y * nx - d.x * ny, d.z);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_data::Field;

    #[test]
    fn downstream_point_has_positive_x() {
        let txyh = Coords::from_row_slice(
            1,
            2,
            &[Vector3::new(0.0, 0.0, 100.0), Vector3::new(500.0, 0.0, 100.0)],
        );
        let mut fdata = FarmData::new(0, txyh.clone());
        fdata
            .insert(Var::AmbWd, Field::from_element(1, 2, 270.0))
            .unwrap();
        let w = RotorWd.get_wake_coos(&fdata, &[0], &txyh).unwrap();
        assert!(w[(0, 0)].norm() < 1e-12);
        assert!((w[(0, 1)].x - 500.0).abs() < 1e-9);
        assert!(w[(0, 1)].y.abs() < 1e-9);

        let north = Coords::from_element(1, 1, Vector3::new(0.0, 100.0, 130.0));
        let w = RotorWd.get_wake_coos(&fdata, &[0], &north).unwrap();
        // lateral axis points left of the flow
        assert!((w[(0, 0)].y - 100.0).abs() < 1e-9);
        assert!((w[(0, 0)].z - 30.0).abs() < 1e-12);
    }
}
