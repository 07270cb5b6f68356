use wf_project::schema::*;
use wf_project::{load_json, load_yaml, save_json, save_yaml, validate_case};

fn row_case() -> Case {
    Case {
        version: 1,
        name: "Two in a row".to_string(),
        turbine_types: vec![TurbineTypeDef::PCtCurve {
            name: "tab".to_string(),
            diameter_m: 120.0,
            hub_height_m: 100.0,
            ws: vec![3.0, 10.0, 25.0],
            p_kw: vec![0.0, 3000.0, 3000.0],
            ct: vec![0.8, 0.75, 0.1],
            rho_ref: 1.225,
        }],
        farm: FarmDef {
            name: "row".to_string(),
            turbines: vec![
                TurbineDef {
                    name: "A".to_string(),
                    x: 0.0,
                    y: 0.0,
                    turbine_type: "tab".to_string(),
                    hub_height_m: None,
                    diameter_m: None,
                },
                TurbineDef {
                    name: "B".to_string(),
                    x: 600.0,
                    y: 0.0,
                    turbine_type: "tab".to_string(),
                    hub_height_m: Some(110.0),
                    diameter_m: None,
                },
            ],
        },
        states: StatesDef::Table {
            rows: vec![
                StateRowDef {
                    ws: 8.0,
                    wd: 270.0,
                    ti: 0.05,
                    rho: 1.225,
                    weight: 2.0,
                    label: None,
                },
                StateRowDef {
                    ws: 12.0,
                    wd: 300.0,
                    ti: 0.08,
                    rho: 1.2,
                    weight: 1.0,
                    label: None,
                },
            ],
        },
        post_models: vec![PointModelDef::PowerLawShear {
            ref_height_m: 100.0,
            alpha: 0.2,
        }],
        point_models: vec![PointModelDef::PowerDensity],
        rotor: RotorDef::Grid { n: 2 },
        wake_frame: WakeFrameDef::RotorWd,
        wake_models: vec![
            WakeModelDef::LinearDecay {
                deficit: 0.3,
                length_m: 2000.0,
                radius_factor: Some(1.5),
                superposition: None,
                lim_low: Some(0.5),
            },
            WakeModelDef::CrespoHernandez {
                k: 0.04,
                superposition: Some("ti_max".to_string()),
            },
        ],
        partial_wakes: PartialWakesDef::DistSliced { n: Some(3) },
        chunks: ChunksDef {
            states: Some(1),
            points: None,
        },
        points: Some(PointGridDef {
            x_min: 0.0,
            x_max: 1000.0,
            y_min: -100.0,
            y_max: 100.0,
            resolution_m: 100.0,
            height_m: 100.0,
        }),
    }
}

#[test]
fn roundtrip_yaml_full_case() {
    let case = row_case();
    validate_case(&case).unwrap();

    let path = std::env::temp_dir().join("wf_project_roundtrip_full.yaml");
    save_yaml(&path, &case).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(case, loaded);
}

#[test]
fn roundtrip_json_full_case() {
    let case = row_case();

    let path = std::env::temp_dir().join("wf_project_roundtrip_full.json");
    save_json(&path, &case).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(case.farm, loaded.farm);
    assert_eq!(case.partial_wakes, loaded.partial_wakes);
    assert_eq!(case.rotor, loaded.rotor);
    assert_eq!(loaded.wake_models.len(), 2);
    assert_eq!(loaded.wake_models[1].superposition(), "ti_max");
    assert_eq!(loaded.wake_models[0].lim_low(), Some(0.5));
}

#[test]
fn defaults_fill_omitted_sections() {
    let yaml = r#"
version: 1
name: minimal
turbine_types:
  - type: idealized
    name: g
    diameter_m: 100.0
    hub_height_m: 90.0
    rated_kw: 2000.0
    ct: 0.8
farm:
  name: f
  turbines:
    - { name: T0, x: 0.0, y: 0.0, turbine_type: g }
states:
  type: uniform
  ws: 8.0
  wd: 270.0
  ti: 0.05
"#;
    let case: Case = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(case.rotor, RotorDef::Centre);
    assert_eq!(case.partial_wakes, PartialWakesDef::RotorPoints);
    assert_eq!(case.chunks, ChunksDef::default());
    assert!(case.wake_models.is_empty());
    assert!(matches!(case.states, StatesDef::Uniform { rho, .. } if rho == 1.225));
    validate_case(&case).unwrap();
}

#[test]
fn version_zero_is_migrated() {
    let mut case = row_case();
    case.version = 0;
    let path = std::env::temp_dir().join("wf_project_migrate_v0.yaml");
    std::fs::write(&path, serde_yaml::to_string(&case).unwrap()).unwrap();

    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded.version, wf_project::LATEST_VERSION);
}
