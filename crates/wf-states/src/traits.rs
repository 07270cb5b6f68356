//! Provider and point-model contracts.

use std::sync::Arc;

use wf_core::{Var, WfError, WfResult};
use wf_data::{FarmData, Field, PointData};

/// Computes variables at the points of a [`PointData`] chunk.
pub trait PointDataModel: Send + Sync {
    fn name(&self) -> &str;

    /// Variables written by [`PointDataModel::calculate`].
    fn output_point_vars(&self) -> Vec<Var>;

    fn calculate(&self, fdata: &FarmData, pdata: &mut PointData) -> WfResult<()>;
}

/// The ambient inflow provider.
///
/// A `States` is itself a point-data model: evaluated at any set of points
/// it writes the undisturbed values of its output variables there.
pub trait States: PointDataModel {
    /// Total number of states.
    fn size(&self) -> usize;

    /// Optional labels, one per state.
    fn index(&self) -> Option<Vec<String>> {
        None
    }

    /// Unchecked statistical weights, shape `(state, turbine)`.
    fn raw_weights(&self, n_turbines: usize) -> WfResult<Field>;

    /// Statistical weights, shape-checked against `(size, n_turbines)`.
    fn weights(&self, n_turbines: usize) -> WfResult<Field> {
        let w = self.raw_weights(n_turbines)?;
        let expected = (self.size(), n_turbines);
        if w.shape() != expected {
            return Err(WfError::dimension("state weights", expected, w.shape()));
        }
        Ok(w)
    }
}

/// Ordered chain of point-data models run as one.
#[derive(Clone, Default)]
pub struct PointDataModelList {
    models: Vec<Arc<dyn PointDataModel>>,
}

impl PointDataModelList {
    pub fn new(models: Vec<Arc<dyn PointDataModel>>) -> Self {
        Self { models }
    }

    pub fn push(&mut self, model: Arc<dyn PointDataModel>) {
        self.models.push(model);
    }

    pub fn models(&self) -> &[Arc<dyn PointDataModel>] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for PointDataModelList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.models.iter().map(|m| m.name()))
            .finish()
    }
}

impl PointDataModel for PointDataModelList {
    fn name(&self) -> &str {
        "point_models"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        let mut out: Vec<Var> = Vec::new();
        for m in &self.models {
            for v in m.output_point_vars() {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }

    fn calculate(&self, fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        for m in &self.models {
            m.calculate(fdata, pdata)?;
        }
        Ok(())
    }
}
