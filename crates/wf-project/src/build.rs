//! Construction of runtime objects from a validated case.

use std::sync::Arc;

use nalgebra::Vector3;
use tracing::debug;
use wf_algo::{AlgoConfig, Downwind};
use wf_core::WfError;
use wf_core::units::{kgpm3, m};
use wf_data::{Coords, Turbine, WindFarm};
use wf_models::superposition::by_name;
use wf_models::{
    Bastankhah2014, CentreRotor, CrespoHernandez, GridRotor, Jensen, LinearDecay, PCtCurve,
    PartialDistSliced, PartialWakesModel, RotorModel, RotorPoints, RotorWd, Superposition,
    TurbineType, WakeFrame, WakeModel, WsLinear,
};
use wf_states::{
    ExtendedStates, PointDataModel, PowerDensity, PowerLawShear, StateRow, States, StatesTable,
    UniformStates,
};

use crate::ProjectResult;
use crate::schema::{
    Case, PartialWakesDef, PointGridDef, PointModelDef, RotorDef, StatesDef, TurbineTypeDef,
    WakeFrameDef, WakeModelDef,
};
use crate::validate::validate_case;

/// Validate `case` and assemble the downwind algorithm it describes.
pub fn build_algorithm(case: &Case) -> ProjectResult<Downwind> {
    validate_case(case)?;

    let mut farm = WindFarm::new(case.farm.name.clone());
    for t in &case.farm.turbines {
        let mut turbine = Turbine::new(t.name.clone(), t.x, t.y, t.turbine_type.clone());
        if let Some(h) = t.hub_height_m {
            turbine = turbine.with_hub_height(m(h));
        }
        if let Some(d) = t.diameter_m {
            turbine = turbine.with_diameter(m(d));
        }
        farm.add_turbine(turbine);
    }

    let mut builder = Downwind::builder(farm, build_states(case)?)
        .rotor(build_rotor(&case.rotor)?)
        .wake_frame(build_wake_frame(&case.wake_frame))
        .partial_wakes(build_partial_wakes(&case.partial_wakes)?);
    for tt in &case.turbine_types {
        builder = builder.turbine_type(build_turbine_type(tt)?);
    }
    for wm in &case.wake_models {
        builder = builder.wake_model(build_wake_model(wm)?);
    }
    for pm in &case.point_models {
        builder = builder.point_model(build_point_model(pm)?);
    }

    let mut config = AlgoConfig::default();
    if let Some(n) = case.chunks.states {
        config = config.with_chunk_states(n);
    }
    if let Some(n) = case.chunks.points {
        config = config.with_chunk_points(n);
    }

    debug!(
        case = case.name.as_str(),
        turbine_types = case.turbine_types.len(),
        wake_models = case.wake_models.len(),
        "building algorithm"
    );
    Ok(builder.config(config).build()?)
}

/// Base states, wrapped with the post models when any are given.
fn build_states(case: &Case) -> ProjectResult<Arc<dyn States>> {
    let base: Arc<dyn States> = match &case.states {
        StatesDef::Uniform { ws, wd, ti, rho } => Arc::new(UniformStates::new(*ws, *wd, *ti, *rho)?),
        StatesDef::Table { rows } => {
            let table = StatesTable::new(
                rows.iter()
                    .map(|r| StateRow {
                        ws: r.ws,
                        wd: r.wd,
                        ti: r.ti,
                        rho: r.rho,
                        weight: r.weight,
                    })
                    .collect(),
            )?;
            let labels: Option<Vec<String>> = rows.iter().map(|r| r.label.clone()).collect();
            match labels {
                Some(labels) => Arc::new(table.with_labels(labels)?),
                None => Arc::new(table),
            }
        }
    };
    if case.post_models.is_empty() {
        return Ok(base);
    }
    let models = case
        .post_models
        .iter()
        .map(build_point_model)
        .collect::<ProjectResult<Vec<_>>>()?;
    Ok(Arc::new(ExtendedStates::new(base).extend(models)))
}

fn build_point_model(def: &PointModelDef) -> ProjectResult<Arc<dyn PointDataModel>> {
    let model: Arc<dyn PointDataModel> = match def {
        PointModelDef::PowerLawShear {
            ref_height_m,
            alpha,
        } => Arc::new(PowerLawShear::new(*ref_height_m, *alpha)?),
        PointModelDef::PowerDensity => Arc::new(PowerDensity),
    };
    Ok(model)
}

fn build_rotor(def: &RotorDef) -> ProjectResult<Arc<dyn RotorModel>> {
    let rotor: Arc<dyn RotorModel> = match def {
        RotorDef::Centre => Arc::new(CentreRotor::new()),
        RotorDef::Grid { n } => Arc::new(GridRotor::new(*n)?),
    };
    Ok(rotor)
}

fn build_wake_frame(def: &WakeFrameDef) -> Arc<dyn WakeFrame> {
    match def {
        WakeFrameDef::RotorWd => Arc::new(RotorWd),
    }
}

fn build_partial_wakes(def: &PartialWakesDef) -> ProjectResult<Arc<dyn PartialWakesModel>> {
    let pw: Arc<dyn PartialWakesModel> = match def {
        PartialWakesDef::RotorPoints => Arc::new(RotorPoints),
        PartialWakesDef::DistSliced { n } => Arc::new(PartialDistSliced::new(*n)?),
    };
    Ok(pw)
}

fn build_turbine_type(def: &TurbineTypeDef) -> ProjectResult<Arc<dyn TurbineType>> {
    let curve = match def {
        TurbineTypeDef::PCtCurve {
            name,
            diameter_m,
            hub_height_m,
            ws,
            p_kw,
            ct,
            rho_ref,
        } => PCtCurve::new(
            name.clone(),
            m(*diameter_m),
            m(*hub_height_m),
            ws.clone(),
            p_kw.clone(),
            ct.clone(),
        )?
        .with_rho_ref(kgpm3(*rho_ref)),
        TurbineTypeDef::Idealized {
            name,
            diameter_m,
            hub_height_m,
            rated_kw,
            ct,
        } => PCtCurve::idealized(name.clone(), m(*diameter_m), m(*hub_height_m), *rated_kw, *ct)?,
    };
    Ok(Arc::new(curve))
}

fn build_superposition(def: &WakeModelDef) -> ProjectResult<Arc<dyn Superposition>> {
    let name = def.superposition();
    let rule: Arc<dyn Superposition> = match (name, def.lim_low()) {
        (_, None) => by_name(name)?,
        ("ws_linear", Some(lim)) => Arc::new(WsLinear::new(false).with_lim_low(lim)),
        ("ws_linear_amb", Some(lim)) => Arc::new(WsLinear::new(true).with_lim_low(lim)),
        (_, Some(_)) => {
            let err = WfError::configuration(name, "does not support a lower speed limit");
            return Err(err.into());
        }
    };
    Ok(rule)
}

fn build_wake_model(def: &WakeModelDef) -> ProjectResult<Arc<dyn WakeModel>> {
    let rule = build_superposition(def)?;
    let model: Arc<dyn WakeModel> = match def {
        WakeModelDef::Jensen { k, .. } => Arc::new(Jensen::new(*k, rule)),
        WakeModelDef::Bastankhah2014 { k, sbeta_factor, .. } => {
            let model = Bastankhah2014::new(*k, rule);
            match sbeta_factor {
                Some(f) => Arc::new(model.with_sbeta_factor(*f)),
                None => Arc::new(model),
            }
        }
        WakeModelDef::LinearDecay {
            deficit,
            length_m,
            radius_factor,
            ..
        } => {
            let model = LinearDecay::new(*deficit, *length_m, rule);
            match radius_factor {
                Some(f) => Arc::new(model.with_radius_factor(*f)),
                None => Arc::new(model),
            }
        }
        WakeModelDef::CrespoHernandez { k, .. } => Arc::new(CrespoHernandez::new(*k, rule)),
    };
    Ok(model)
}

/// Grid points, x fastest, repeated for every state.
pub fn point_grid(grid: &PointGridDef, n_states: usize) -> Coords {
    let axis = |lo: f64, hi: f64| -> Vec<f64> {
        let n = ((hi - lo) / grid.resolution_m + 1e-9).floor() as usize + 1;
        (0..n).map(|i| lo + i as f64 * grid.resolution_m).collect()
    };
    let xs = axis(grid.x_min, grid.x_max);
    let ys = axis(grid.y_min, grid.y_max);
    let pts: Vec<Vector3<f64>> = ys
        .iter()
        .flat_map(|&y| xs.iter().map(move |&x| Vector3::new(x, y, grid.height_m)))
        .collect();
    Coords::from_fn(n_states, pts.len(), |_, p| pts[p])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_both_ends() {
        let grid = PointGridDef {
            x_min: 0.0,
            x_max: 100.0,
            y_min: -10.0,
            y_max: 10.0,
            resolution_m: 50.0,
            height_m: 90.0,
        };
        let pts = point_grid(&grid, 2);
        assert_eq!(pts.shape(), (2, 3));
        assert_eq!(pts[(1, 2)], Vector3::new(100.0, -10.0, 90.0));
    }

    #[test]
    fn grid_of_one_point() {
        let grid = PointGridDef {
            x_min: 5.0,
            x_max: 5.0,
            y_min: 7.0,
            y_max: 7.0,
            resolution_m: 1.0,
            height_m: 90.0,
        };
        assert_eq!(point_grid(&grid, 1).shape(), (1, 1));
    }
}
