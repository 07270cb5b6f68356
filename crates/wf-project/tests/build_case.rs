use std::path::Path;

use wf_core::Var;
use wf_project::schema::*;
use wf_project::{ProjectError, ValidationError, build_algorithm, load_case, point_grid};

fn demos() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/cases")
}

#[test]
fn demo_cases_load_and_build() {
    for name in ["01_single_row.yaml", "02_wind_rose.yaml"] {
        let case = load_case(&demos().join(name))
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        build_algorithm(&case).unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
    }
}

#[test]
fn single_row_demo_runs() {
    let case = load_case(&demos().join("01_single_row.yaml")).unwrap();
    let algo = build_algorithm(&case).unwrap();
    let farm = algo.calc_farm().unwrap();

    let ws = farm.get(Var::Rews).unwrap();
    let amb = farm.get(Var::AmbRews).unwrap();
    assert!((ws[(0, 0)] - amb[(0, 0)]).abs() < 1e-9);
    assert!(ws[(0, 1)] < amb[(0, 1)]);
    assert!(ws[(0, 2)] < amb[(0, 2)]);
    let ti = farm.get(Var::Ti).unwrap();
    assert!(ti[(0, 2)] > 0.06);

    let grid = case.points.as_ref().unwrap();
    let points = point_grid(grid, algo.n_states());
    let res = algo.calc_points(&farm, &points).unwrap();
    assert_eq!(res.n_points(), points.ncols());
    assert!(res.contains(Var::Wpd));
}

#[test]
fn wind_rose_demo_keeps_state_order() {
    let case = load_case(&demos().join("02_wind_rose.yaml")).unwrap();
    let algo = build_algorithm(&case).unwrap();
    let farm = algo.calc_farm().unwrap();
    assert_eq!(farm.n_states(), 5);
    assert_eq!(farm.n_turbines(), 4);
    let wd = farm.get(Var::AmbWd).unwrap();
    assert!((wd[(3, 0)] - 270.0).abs() < 1e-9);
    let weights = farm.get(Var::Weight).unwrap();
    assert!((weights.sum() / 4.0 - 1.0).abs() < 1e-12);
}

#[test]
fn build_rejects_invalid_case() {
    let mut case = load_case(&demos().join("01_single_row.yaml")).unwrap();
    case.farm.turbines[1].turbine_type = "nope".to_string();
    assert!(matches!(
        build_algorithm(&case),
        Err(ProjectError::Validation(ValidationError::MissingReference { .. }))
    ));
}

#[test]
fn build_rejects_mixed_speed_rules() {
    let mut case = load_case(&demos().join("01_single_row.yaml")).unwrap();
    case.wake_models.push(WakeModelDef::Jensen {
        k: 0.05,
        superposition: Some("ws_max".to_string()),
        lim_low: None,
    });
    assert!(matches!(build_algorithm(&case), Err(ProjectError::Engine(_))));
}

#[test]
fn speed_limit_reaches_the_superposition() {
    let mut case = load_case(&demos().join("01_single_row.yaml")).unwrap();
    match &mut case.wake_models[0] {
        WakeModelDef::Bastankhah2014 { lim_low, .. } => *lim_low = Some(8.5),
        other => panic!("unexpected first wake model {other:?}"),
    }
    let farm = build_algorithm(&case).unwrap().calc_farm().unwrap();
    let ws = farm.get(Var::Rews).unwrap();
    for t in 1..3 {
        assert!(ws[(0, t)] >= 8.5 - 1e-9, "T{t}: {}", ws[(0, t)]);
        assert!(ws[(0, t)] < 9.0);
    }
}
