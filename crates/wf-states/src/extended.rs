//! States extended by a chain of point-data models.

use std::ops::Add;
use std::sync::Arc;

use tracing::debug;
use wf_core::{Var, WfError, WfResult};
use wf_data::{FarmData, Field, PointData};

use crate::traits::{PointDataModel, PointDataModelList, States};

/// A base provider followed by post-processing models.
///
/// Size, index and weights are those of the base. Two extended states can
/// only be merged when they share the same base object.
#[derive(Clone)]
pub struct ExtendedStates {
    base: Arc<dyn States>,
    models: PointDataModelList,
}

impl ExtendedStates {
    pub fn new(base: Arc<dyn States>) -> Self {
        Self {
            base,
            models: PointDataModelList::default(),
        }
    }

    pub fn base(&self) -> &Arc<dyn States> {
        &self.base
    }

    pub fn models(&self) -> &PointDataModelList {
        &self.models
    }

    pub fn append(mut self, model: Arc<dyn PointDataModel>) -> Self {
        self.models.push(model);
        self
    }

    pub fn extend<I>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn PointDataModel>>,
    {
        for m in models {
            self.models.push(m);
        }
        self
    }

    pub fn same_base(&self, other: &ExtendedStates) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.base), Arc::as_ptr(&other.base))
    }

    /// Append the chain of `other`, which must share this base.
    pub fn merge(self, other: &ExtendedStates) -> WfResult<Self> {
        if !self.same_base(other) {
            return Err(WfError::Incompatible {
                what: format!(
                    "cannot merge extended states with different bases '{}' and '{}'",
                    self.base.name(),
                    other.base.name()
                ),
            });
        }
        debug!(
            base = self.base.name(),
            added = other.models.len(),
            "merging extended states"
        );
        Ok(self.extend(other.models.models().iter().cloned()))
    }
}

impl std::fmt::Debug for ExtendedStates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedStates")
            .field("base", &self.base.name())
            .field("models", &self.models)
            .finish()
    }
}

impl PointDataModel for ExtendedStates {
    fn name(&self) -> &str {
        "extended_states"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        let mut out = self.base.output_point_vars();
        for v in self.models.output_point_vars() {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    fn calculate(&self, fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        self.base.calculate(fdata, pdata)?;
        self.models.calculate(fdata, pdata)
    }
}

impl States for ExtendedStates {
    fn size(&self) -> usize {
        self.base.size()
    }

    fn index(&self) -> Option<Vec<String>> {
        self.base.index()
    }

    fn raw_weights(&self, n_turbines: usize) -> WfResult<Field> {
        self.base.raw_weights(n_turbines)
    }
}

impl Add<Arc<dyn PointDataModel>> for ExtendedStates {
    type Output = ExtendedStates;

    fn add(self, model: Arc<dyn PointDataModel>) -> ExtendedStates {
        self.append(model)
    }
}

impl Add<Vec<Arc<dyn PointDataModel>>> for ExtendedStates {
    type Output = ExtendedStates;

    fn add(self, models: Vec<Arc<dyn PointDataModel>>) -> ExtendedStates {
        self.extend(models)
    }
}

impl Add<&ExtendedStates> for ExtendedStates {
    type Output = WfResult<ExtendedStates>;

    fn add(self, other: &ExtendedStates) -> WfResult<ExtendedStates> {
        self.merge(other)
    }
}
