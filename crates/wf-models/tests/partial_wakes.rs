use std::sync::Arc;

use nalgebra::Vector3;
use wf_core::Var;
use wf_data::{Coords, FarmData, ModelData, RotorPointData, VarTable};
use wf_models::{
    Bastankhah2014, GridRotor, PartialDistSliced, PartialWakesModel, RotorModel, RotorPoints,
    RotorWd, WakeContext, WakeModel, WsLinear,
};

const WS: f64 = 10.0;

/// Two turbines, the second 5 D downstream and 0.3 D off the wake axis.
fn farm() -> FarmData {
    let txyh = Coords::from_row_slice(
        1,
        2,
        &[Vector3::new(0.0, 0.0, 100.0), Vector3::new(500.0, 30.0, 100.0)],
    );
    let mut fdata = FarmData::new(0, txyh);
    let vars = fdata.vars_mut();
    vars.fill(Var::AmbWd, 270.0);
    vars.fill(Var::D, 100.0);
    vars.fill(Var::Ct, 0.8);
    vars.fill(Var::Rews, WS);
    vars.fill(Var::AmbRews, WS);
    fdata
}

fn model_data(fdata: &FarmData, rotor: &dyn RotorModel) -> ModelData {
    let points = rotor.get_rotor_points(fdata).unwrap();
    let mut amb = VarTable::new("rotor points", 1, points.ncols());
    amb.fill(Var::Ws, WS);
    amb.fill(Var::Wd, 270.0);
    let mut mdata = ModelData::new();
    mdata.set_rotor(RotorPointData {
        points,
        weights: rotor.rotor_point_weights().to_vec(),
        amb_results: amb,
    });
    mdata
}

fn waked_ws(pw: &dyn PartialWakesModel, rotor: &dyn RotorModel) -> f64 {
    let mut fdata = farm();
    let mut mdata = model_data(&fdata, rotor);
    let models: Vec<Arc<dyn WakeModel>> = vec![Arc::new(Bastankhah2014::new(
        0.04,
        Arc::new(WsLinear::new(false)),
    ))];
    pw.check_wake_models(&models).unwrap();
    let ctx = WakeContext {
        wake_frame: &RotorWd,
        wake_models: &models,
        rotor,
    };
    let mut deltas = pw.new_wake_deltas(&ctx, &fdata, &mut mdata).unwrap();
    pw.contribute_to_wake_deltas(&ctx, &fdata, &mut mdata, &[0], &mut deltas)
        .unwrap();
    pw.evaluate_results(&ctx, &mut fdata, &mut mdata, &deltas, &[1])
        .unwrap();
    fdata.at(Var::Ws, 0, 1).unwrap()
}

#[test]
fn grid_refinement_converges_to_rotor_average() {
    let fine = GridRotor::new(40).unwrap();
    let reference = waked_ws(&RotorPoints, &fine);
    assert!(reference < WS);

    let coarse = waked_ws(&PartialDistSliced::new(Some(1)).unwrap(), &fine);
    let dense = waked_ws(&PartialDistSliced::new(Some(20)).unwrap(), &fine);
    let err_coarse = (coarse - reference).abs();
    let err_dense = (dense - reference).abs();
    assert!(err_dense < err_coarse, "{err_dense} vs {err_coarse}");
    assert!(err_dense < 0.02, "{err_dense}");
}

#[test]
fn sliced_on_primary_points_matches_rotor_points() {
    let rotor = GridRotor::new(6).unwrap();
    let a = waked_ws(&RotorPoints, &rotor);
    let b = waked_ws(&PartialDistSliced::new(None).unwrap(), &rotor);
    assert!((a - b).abs() < 1e-9, "{a} vs {b}");
}

#[test]
fn upstream_turbine_is_untouched() {
    let rotor = GridRotor::new(4).unwrap();
    let mut fdata = farm();
    let mut mdata = model_data(&fdata, &rotor);
    let models: Vec<Arc<dyn WakeModel>> = vec![Arc::new(Bastankhah2014::new(
        0.04,
        Arc::new(WsLinear::new(false)),
    ))];
    let ctx = WakeContext {
        wake_frame: &RotorWd,
        wake_models: &models,
        rotor: &rotor,
    };
    let pw = PartialDistSliced::new(Some(5)).unwrap();
    let mut deltas = pw.new_wake_deltas(&ctx, &fdata, &mut mdata).unwrap();
    // the downstream turbine's wake never reaches the upstream one
    pw.contribute_to_wake_deltas(&ctx, &fdata, &mut mdata, &[1], &mut deltas)
        .unwrap();
    pw.evaluate_results(&ctx, &mut fdata, &mut mdata, &deltas, &[0])
        .unwrap();
    assert!((fdata.at(Var::Ws, 0, 0).unwrap() - WS).abs() < 1e-12);
}
