//! Per-chunk model scratch data.

use std::collections::HashMap;

use wf_core::{WfError, WfResult};

use crate::table::{Coords, VarTable};

/// Rotor sampling of one chunk: points, weights and ambient results there.
#[derive(Debug, Clone, PartialEq)]
pub struct RotorPointData {
    /// Rotor points, shape `(state, turbine * n_rpoints)`.
    pub points: Coords,
    /// Integration weights, one per rotor point, summing to 1.
    pub weights: Vec<f64>,
    /// Ambient results at the rotor points.
    pub amb_results: VarTable,
}

impl RotorPointData {
    pub fn n_rpoints(&self) -> usize {
        self.weights.len()
    }
}

/// Model data: scratch owned by one chunk for the duration of a pass.
///
/// Models that want to cache derived geometry store it here rather than in
/// themselves, which keeps the model objects read-only during calculation.
#[derive(Debug, Default, Clone)]
pub struct ModelData {
    rotor: Option<RotorPointData>,
    coords_cache: HashMap<String, Coords>,
}

impl ModelData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rotor(&mut self, rotor: RotorPointData) {
        self.rotor = Some(rotor);
    }

    pub fn rotor(&self) -> WfResult<&RotorPointData> {
        self.rotor.as_ref().ok_or_else(|| WfError::MissingInput {
            what: "rotor point data has not been computed for this chunk".to_string(),
        })
    }

    /// Coordinates cached under `key`, computed by `make` on first access.
    pub fn cached_coords<F>(&mut self, key: &str, make: F) -> WfResult<&Coords>
    where
        F: FnOnce() -> WfResult<Coords>,
    {
        if !self.coords_cache.contains_key(key) {
            let coords = make()?;
            self.coords_cache.insert(key.to_string(), coords);
        }
        self.coords_cache
            .get(key)
            .ok_or_else(|| WfError::MissingInput {
                what: format!("cached coordinates '{key}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn cache_computes_once() {
        let mut mdata = ModelData::new();
        let mut calls = 0;
        for _ in 0..3 {
            let c = mdata
                .cached_coords("grid", || {
                    calls += 1;
                    Ok(Coords::from_element(1, 2, Vector3::zeros()))
                })
                .unwrap();
            assert_eq!(c.ncols(), 2);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn rotor_missing_is_reported() {
        let mdata = ModelData::new();
        assert!(mdata.rotor().is_err());
    }
}
