//! The downwind algorithm.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Range;
use std::sync::Arc;

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use wf_core::units::in_m;
use wf_core::{Var, WfError, WfResult};
use wf_data::{
    ChunkRange, Coords, FarmData, Field, ModelData, PointData, RotorPointData, WindFarm,
    split_range,
};
use wf_models::{
    CentreRotor, PartialWakesModel, RotorModel, RotorPoints, RotorWd, TurbineType, WakeContext,
    WakeFrame, WakeModel,
};
use wf_states::{PointDataModel, PointDataModelList, States};

use crate::config::AlgoConfig;
use crate::farm_wakes::{FarmWakesCalculation, run_turbine_types};
use crate::point_wakes::PointWakesCalculation;

/// Builder for [`Downwind`].
///
/// Defaults: centre rotor, rotor wind direction wake frame, rotor-points
/// partial wakes, no wake models.
pub struct DownwindBuilder {
    farm: WindFarm,
    states: Arc<dyn States>,
    rotor: Arc<dyn RotorModel>,
    wake_frame: Arc<dyn WakeFrame>,
    wake_models: Vec<Arc<dyn WakeModel>>,
    partial_wakes: Arc<dyn PartialWakesModel>,
    turbine_types: BTreeMap<String, Arc<dyn TurbineType>>,
    point_models: PointDataModelList,
    config: AlgoConfig,
}

impl DownwindBuilder {
    pub fn rotor(mut self, rotor: Arc<dyn RotorModel>) -> Self {
        self.rotor = rotor;
        self
    }

    pub fn wake_frame(mut self, frame: Arc<dyn WakeFrame>) -> Self {
        self.wake_frame = frame;
        self
    }

    pub fn wake_model(mut self, model: Arc<dyn WakeModel>) -> Self {
        self.wake_models.push(model);
        self
    }

    pub fn partial_wakes(mut self, pw: Arc<dyn PartialWakesModel>) -> Self {
        self.partial_wakes = pw;
        self
    }

    pub fn turbine_type(mut self, tt: Arc<dyn TurbineType>) -> Self {
        self.turbine_types.insert(tt.name().to_string(), tt);
        self
    }

    /// Post-processing model for point calculations, run after the wakes.
    pub fn point_model(mut self, model: Arc<dyn PointDataModel>) -> Self {
        self.point_models.push(model);
        self
    }

    pub fn config(mut self, config: AlgoConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the model combination and build the algorithm.
    pub fn build(self) -> WfResult<Downwind> {
        self.farm.validate()?;
        if self.states.size() == 0 {
            return Err(WfError::InvalidArg {
                what: "states provider has no states".to_string(),
            });
        }

        let mut per_turbine = Vec::with_capacity(self.farm.n_turbines());
        for t in self.farm.turbines() {
            let tt = self.turbine_types.get(&t.turbine_type).ok_or_else(|| {
                WfError::configuration(
                    "downwind",
                    format!(
                        "turbine '{}' references unknown turbine type '{}', available: [{}]",
                        t.name,
                        t.turbine_type,
                        self.turbine_types
                            .keys()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
            })?;
            per_turbine.push(tt.clone());
        }

        self.partial_wakes.check_wake_models(&self.wake_models)?;
        check_superposition(&self.wake_models)?;

        Ok(Downwind {
            farm: self.farm,
            states: self.states,
            rotor: self.rotor,
            wake_frame: self.wake_frame,
            wake_models: self.wake_models,
            partial_wakes: self.partial_wakes,
            turbine_models: per_turbine,
            point_models: self.point_models,
            config: self.config,
        })
    }
}

/// Models sharing a variable must share its superposition rule.
fn check_superposition(models: &[Arc<dyn WakeModel>]) -> WfResult<()> {
    let mut seen: BTreeMap<Var, (&str, &str)> = BTreeMap::new();
    for m in models {
        for (var, rule) in m.superposition().iter() {
            match seen.entry(var) {
                Entry::Occupied(e) => {
                    let (other, other_rule) = *e.get();
                    if other_rule != rule.name() {
                        return Err(WfError::configuration(
                            m.name(),
                            format!(
                                "superposition '{}' for '{var}' differs from '{other_rule}' of wake model '{other}'",
                                rule.name()
                            ),
                        ));
                    }
                }
                Entry::Vacant(e) => {
                    e.insert((m.name(), rule.name()));
                }
            }
        }
    }
    Ok(())
}

/// Upstream-first wake propagation through a wind farm.
pub struct Downwind {
    farm: WindFarm,
    states: Arc<dyn States>,
    rotor: Arc<dyn RotorModel>,
    wake_frame: Arc<dyn WakeFrame>,
    wake_models: Vec<Arc<dyn WakeModel>>,
    partial_wakes: Arc<dyn PartialWakesModel>,
    turbine_models: Vec<Arc<dyn TurbineType>>,
    point_models: PointDataModelList,
    config: AlgoConfig,
}

impl Downwind {
    pub fn builder(farm: WindFarm, states: Arc<dyn States>) -> DownwindBuilder {
        DownwindBuilder {
            farm,
            states,
            rotor: Arc::new(CentreRotor::new()),
            wake_frame: Arc::new(RotorWd),
            wake_models: Vec::new(),
            partial_wakes: Arc::new(RotorPoints),
            turbine_types: BTreeMap::new(),
            point_models: PointDataModelList::default(),
            config: AlgoConfig::default(),
        }
    }

    pub fn farm(&self) -> &WindFarm {
        &self.farm
    }

    pub fn states(&self) -> &Arc<dyn States> {
        &self.states
    }

    pub fn n_states(&self) -> usize {
        self.states.size()
    }

    pub fn n_turbines(&self) -> usize {
        self.farm.n_turbines()
    }

    fn ctx(&self) -> WakeContext<'_> {
        WakeContext {
            wake_frame: self.wake_frame.as_ref(),
            wake_models: &self.wake_models,
            rotor: self.rotor.as_ref(),
        }
    }

    fn chunk_ranges(&self, total: usize, size: Option<usize>, axis: &str) -> Vec<Range<usize>> {
        if let Some(n) = size {
            if n > total {
                warn!(axis, chunk_size = n, total, "chunk size exceeds data size");
            }
        }
        split_range(total, size)
    }

    /// Waked results at every turbine, shape `(state, turbine)`.
    pub fn calc_farm(&self) -> WfResult<FarmData> {
        let n_states = self.n_states();
        let n_turbines = self.n_turbines();
        let weights = self.states.weights(n_turbines)?;
        let ranges = self.chunk_ranges(n_states, self.config.chunk_states, "states");
        info!(
            n_states,
            n_turbines,
            n_chunks = ranges.len(),
            n_wake_models = self.wake_models.len(),
            "calculating farm"
        );

        let parts = ranges
            .par_iter()
            .map(|r| self.calc_farm_chunk(r.clone(), &weights))
            .collect::<WfResult<Vec<_>>>()?;
        let fdata = FarmData::concat_states(&parts)?;

        info!(n_states, n_turbines, "farm calculation done");
        Ok(fdata)
    }

    fn calc_farm_chunk(&self, states: Range<usize>, weights: &Field) -> WfResult<FarmData> {
        let n_s = states.len();
        let turbines = self.farm.turbines();

        let mut d = Vec::with_capacity(turbines.len());
        let mut h = Vec::with_capacity(turbines.len());
        for (t, tt) in turbines.iter().zip(&self.turbine_models) {
            d.push(in_m(t.diameter.unwrap_or_else(|| tt.diameter())));
            h.push(in_m(t.hub_height.unwrap_or_else(|| tt.hub_height())));
        }
        let txyh = Coords::from_fn(n_s, turbines.len(), |_, t| {
            Vector3::new(turbines[t].xy[0], turbines[t].xy[1], h[t])
        });
        let mut fdata = FarmData::new(states.start, txyh);
        fdata.insert(Var::D, Field::from_fn(n_s, turbines.len(), |_, t| d[t]))?;
        fdata.insert(Var::H, Field::from_fn(n_s, turbines.len(), |_, t| h[t]))?;
        fdata.insert(Var::Weight, weights.rows(states.start, n_s).into_owned())?;

        let mut mdata = ModelData::new();
        self.ambient_pass(&mut fdata, &mut mdata)?;
        fdata.set_order(self.wake_frame.calc_order(&fdata)?)?;

        FarmWakesCalculation {
            ctx: self.ctx(),
            partial_wakes: self.partial_wakes.as_ref(),
            turbine_types: &self.turbine_models,
        }
        .calculate(&mut fdata, &mut mdata)?;

        debug!(states = ?states, "farm chunk done");
        Ok(fdata)
    }

    /// Ambient results at every rotor, then turbine types.
    fn ambient_pass(&self, fdata: &mut FarmData, mdata: &mut ModelData) -> WfResult<()> {
        // rotors face the ambient direction at the hub
        let mut hub = PointData::new(fdata.states_i0(), 0, fdata.txyh().clone());
        self.states.calculate(fdata, &mut hub)?;
        let hub_wd = hub.get(Var::Wd)?.clone();
        fdata.insert(Var::AmbWd, hub_wd.clone())?;
        fdata.insert(Var::Yaw, hub_wd)?;

        let points = self.rotor.get_rotor_points(fdata)?;
        let mut rpd = PointData::new(fdata.states_i0(), 0, points.clone());
        self.states.calculate(fdata, &mut rpd)?;
        let amb_results = rpd.vars().clone();
        let weights = self.rotor.rotor_point_weights().to_vec();
        self.rotor
            .eval_rpoint_results(fdata, &amb_results, &weights, None)?;
        mdata.set_rotor(RotorPointData {
            points,
            weights,
            amb_results,
        });

        let pairs: Vec<(usize, usize)> = (0..fdata.n_states())
            .flat_map(|s| (0..fdata.n_turbines()).map(move |t| (s, t)))
            .collect();
        run_turbine_types(fdata, &self.turbine_models, &pairs)?;

        let waked: Vec<Var> = fdata
            .vars()
            .vars()
            .filter(|v| v.amb().is_some())
            .collect();
        for v in waked {
            fdata.vars_mut().copy_to_ambient(v)?;
        }
        Ok(())
    }

    /// Waked results at `points`, shape `(state, point)`.
    ///
    /// `farm_results` is the output of [`Downwind::calc_farm`]; `points` has
    /// one row per state.
    pub fn calc_points(&self, farm_results: &FarmData, points: &Coords) -> WfResult<PointData> {
        let n_states = self.n_states();
        if farm_results.n_states() != n_states || points.nrows() != n_states {
            return Err(WfError::dimension(
                "point coordinates",
                (n_states, points.ncols()),
                points.shape(),
            ));
        }
        let n_points = points.ncols();
        if n_points == 0 {
            let mut pdata = PointData::new(0, 0, points.clone());
            let mut vars = self.states.output_point_vars();
            vars.extend(self.point_models.output_point_vars());
            for v in vars {
                pdata.insert(v, Field::zeros(n_states, 0))?;
            }
            return Ok(pdata);
        }
        let s_ranges = self.chunk_ranges(n_states, self.config.chunk_states, "states");
        let p_ranges = self.chunk_ranges(n_points, self.config.chunk_points, "points");
        let chunks = ChunkRange::grid(&s_ranges, &p_ranges);
        info!(
            n_states,
            n_points,
            n_chunks = chunks.len(),
            "calculating points"
        );

        let parts = chunks
            .par_iter()
            .map(|c| self.calc_points_chunk(farm_results, points, c))
            .collect::<WfResult<Vec<_>>>()?;

        let rows = parts
            .chunks(p_ranges.len().max(1))
            .map(PointData::concat_points)
            .collect::<WfResult<Vec<_>>>()?;
        let pdata = PointData::concat_states(&rows)?;

        info!(n_states, n_points, "point calculation done");
        Ok(pdata)
    }

    fn calc_points_chunk(
        &self,
        farm_results: &FarmData,
        points: &Coords,
        chunk: &ChunkRange,
    ) -> WfResult<PointData> {
        let fdata = farm_results.slice_states(chunk.states.clone())?;
        let pts = points
            .view(
                (chunk.states.start, chunk.points.start),
                (chunk.n_states(), chunk.n_points()),
            )
            .into_owned();
        let mut pdata = PointData::new(chunk.states.start, chunk.points.start, pts);

        self.states.calculate(&fdata, &mut pdata)?;
        let pvars = self.states.output_point_vars();
        for &v in &pvars {
            if v.amb().is_some() && pdata.contains(v) {
                pdata.vars_mut().copy_to_ambient(v)?;
            }
        }

        PointWakesCalculation {
            wake_frame: self.wake_frame.as_ref(),
            wake_models: &self.wake_models,
            pvars,
            emodels: &self.point_models,
        }
        .calculate(&fdata, &mut pdata)?;

        debug!(chunk = chunk.id.index(), "point chunk done");
        Ok(pdata)
    }
}
