use std::sync::Arc;

use nalgebra::Vector3;
use wf_core::{Var, WfError};
use wf_data::{Coords, FarmData, PointData};
use wf_states::{
    ExtendedStates, PointDataModel, PowerDensity, PowerLawShear, StateRow, States, StatesTable,
};

fn ten_states() -> Arc<dyn States> {
    let rows = (0..10)
        .map(|i| StateRow {
            ws: 6.0 + 0.5 * i as f64,
            wd: 36.0 * i as f64,
            ti: 0.06,
            rho: 1.225,
            weight: 1.0 + i as f64,
        })
        .collect();
    Arc::new(StatesTable::new(rows).unwrap())
}

#[test]
fn composite_keeps_base_size_and_weights() {
    let base = ten_states();
    let ext = ExtendedStates::new(base.clone()) + (Arc::new(PowerDensity) as Arc<dyn PointDataModel>);
    assert_eq!(ext.size(), 10);
    assert_eq!(ext.size(), base.size());
    assert_eq!(ext.weights(3).unwrap(), base.weights(3).unwrap());
    assert!(ext.output_point_vars().contains(&Var::Wpd));
}

#[test]
fn chain_runs_after_base() {
    let base = ten_states();
    let models: Vec<Arc<dyn PointDataModel>> = vec![
        Arc::new(PowerLawShear::new(100.0, 0.2).unwrap()),
        Arc::new(PowerDensity),
    ];
    let ext = ExtendedStates::new(base) + models;
    let fdata = FarmData::new(0, Coords::from_element(10, 0, Vector3::zeros()));
    let pts = Coords::from_element(10, 2, Vector3::new(0.0, 0.0, 200.0));
    let mut pdata = PointData::new(0, 0, pts);
    ext.calculate(&fdata, &mut pdata).unwrap();
    let ws = pdata.get(Var::Ws).unwrap()[(0, 0)];
    assert!((ws - 6.0 * 2f64.powf(0.2)).abs() < 1e-12);
    let wpd = pdata.get(Var::Wpd).unwrap()[(0, 0)];
    assert!((wpd - 0.5 * 1.225 * ws.powi(3)).abs() < 1e-9);
}

#[test]
fn merge_requires_same_base() {
    let base = ten_states();
    let a = ExtendedStates::new(base.clone()).append(Arc::new(PowerDensity));
    let b = ExtendedStates::new(base).append(Arc::new(PowerLawShear::new(90.0, 0.1).unwrap()));
    let merged = (a.clone() + &b).unwrap();
    assert_eq!(merged.models().len(), 2);

    let other = ExtendedStates::new(ten_states()).append(Arc::new(PowerDensity));
    let err = (a + &other).unwrap_err();
    assert!(matches!(err, WfError::Incompatible { .. }));
}
