//! Case validation logic.

use std::collections::HashSet;

use crate::schema::{
    Case, PartialWakesDef, PointGridDef, PointModelDef, RotorDef, StatesDef, TurbineTypeDef,
    WakeModelDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn finite(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_case(case: &Case) -> Result<(), ValidationError> {
    if case.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }

    let mut type_names = HashSet::new();
    for tt in &case.turbine_types {
        if !type_names.insert(tt.name()) {
            return Err(ValidationError::DuplicateId {
                id: tt.name().to_string(),
                context: "turbine_types".to_string(),
            });
        }
        validate_turbine_type(tt)?;
    }

    if case.farm.turbines.is_empty() {
        return Err(invalid("farm.turbines", 0, "farm needs at least one turbine"));
    }
    let mut turbine_names = HashSet::new();
    for t in &case.farm.turbines {
        if !turbine_names.insert(t.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: t.name.clone(),
                context: "farm.turbines".to_string(),
            });
        }
        if !type_names.contains(t.turbine_type.as_str()) {
            return Err(ValidationError::MissingReference {
                id: t.turbine_type.clone(),
                context: format!("turbine '{}' turbine_type", t.name),
            });
        }
        finite(format!("{}.x", t.name), t.x)?;
        finite(format!("{}.y", t.name), t.y)?;
        if let Some(h) = t.hub_height_m {
            positive(format!("{}.hub_height_m", t.name), h)?;
        }
        if let Some(d) = t.diameter_m {
            positive(format!("{}.diameter_m", t.name), d)?;
        }
    }

    validate_states(&case.states)?;
    for pm in case.post_models.iter().chain(&case.point_models) {
        if let PointModelDef::PowerLawShear {
            ref_height_m,
            alpha,
        } = pm
        {
            positive("power_law_shear.ref_height_m", *ref_height_m)?;
            finite("power_law_shear.alpha", *alpha)?;
        }
    }

    if let RotorDef::Grid { n } = case.rotor {
        if n == 0 {
            return Err(invalid("rotor.n", n, "grid needs at least one point per side"));
        }
    }
    if let PartialWakesDef::DistSliced { n: Some(0) } = case.partial_wakes {
        return Err(invalid("partial_wakes.n", 0, "grid needs at least one point per side"));
    }

    for wm in &case.wake_models {
        validate_wake_model(wm)?;
    }

    if case.chunks.states == Some(0) {
        return Err(invalid("chunks.states", 0, "chunk size must be positive"));
    }
    if case.chunks.points == Some(0) {
        return Err(invalid("chunks.points", 0, "chunk size must be positive"));
    }

    if let Some(grid) = &case.points {
        validate_grid(grid)?;
    }

    Ok(())
}

fn validate_turbine_type(tt: &TurbineTypeDef) -> Result<(), ValidationError> {
    match tt {
        TurbineTypeDef::PCtCurve {
            name,
            diameter_m,
            hub_height_m,
            ws,
            p_kw,
            ct,
            rho_ref,
        } => {
            positive(format!("{name}.diameter_m"), *diameter_m)?;
            positive(format!("{name}.hub_height_m"), *hub_height_m)?;
            positive(format!("{name}.rho_ref"), *rho_ref)?;
            if ws.len() < 2 || p_kw.len() != ws.len() || ct.len() != ws.len() {
                return Err(invalid(
                    format!("{name}.ws"),
                    format!("{}/{}/{}", ws.len(), p_kw.len(), ct.len()),
                    "ws, p_kw and ct need equal length of at least 2",
                ));
            }
            if ws.windows(2).any(|w| w[1].is_nan() || w[1] <= w[0]) {
                return Err(invalid(format!("{name}.ws"), "table", "must be strictly ascending"));
            }
            for (i, &c) in ct.iter().enumerate() {
                if !(0.0..=1.0).contains(&c) {
                    return Err(invalid(format!("{name}.ct[{i}]"), c, "must lie in [0, 1]"));
                }
            }
            for (i, &p) in p_kw.iter().enumerate() {
                non_negative(format!("{name}.p_kw[{i}]"), p)?;
            }
        }
        TurbineTypeDef::Idealized {
            name,
            diameter_m,
            hub_height_m,
            rated_kw,
            ct,
        } => {
            positive(format!("{name}.diameter_m"), *diameter_m)?;
            positive(format!("{name}.hub_height_m"), *hub_height_m)?;
            positive(format!("{name}.rated_kw"), *rated_kw)?;
            if !(0.0..=1.0).contains(ct) {
                return Err(invalid(format!("{name}.ct"), ct, "must lie in [0, 1]"));
            }
        }
    }
    Ok(())
}

fn validate_states(states: &StatesDef) -> Result<(), ValidationError> {
    match states {
        StatesDef::Uniform { ws, wd, ti, rho } => {
            non_negative("states.ws", *ws)?;
            finite("states.wd", *wd)?;
            non_negative("states.ti", *ti)?;
            positive("states.rho", *rho)?;
        }
        StatesDef::Table { rows } => {
            if rows.is_empty() {
                return Err(invalid("states.rows", 0, "table needs at least one row"));
            }
            let labelled = rows.iter().filter(|r| r.label.is_some()).count();
            if labelled != 0 && labelled != rows.len() {
                return Err(invalid(
                    "states.rows.label",
                    labelled,
                    "either all rows or none carry a label",
                ));
            }
            let mut labels = HashSet::new();
            for (i, r) in rows.iter().enumerate() {
                non_negative(format!("states.rows[{i}].ws"), r.ws)?;
                finite(format!("states.rows[{i}].wd"), r.wd)?;
                non_negative(format!("states.rows[{i}].ti"), r.ti)?;
                positive(format!("states.rows[{i}].rho"), r.rho)?;
                non_negative(format!("states.rows[{i}].weight"), r.weight)?;
                if let Some(label) = &r.label {
                    if !labels.insert(label.as_str()) {
                        return Err(ValidationError::DuplicateId {
                            id: label.clone(),
                            context: "states.rows".to_string(),
                        });
                    }
                }
            }
            if rows.iter().all(|r| r.weight == 0.0) {
                return Err(invalid("states.rows.weight", 0, "weights sum to zero"));
            }
        }
    }
    Ok(())
}

fn validate_wake_model(wm: &WakeModelDef) -> Result<(), ValidationError> {
    match wm {
        WakeModelDef::Jensen { k, .. } | WakeModelDef::CrespoHernandez { k, .. } => {
            non_negative("wake_models.k", *k)?;
        }
        WakeModelDef::Bastankhah2014 { k, sbeta_factor, .. } => {
            non_negative("bastankhah2014.k", *k)?;
            if let Some(f) = sbeta_factor {
                positive("bastankhah2014.sbeta_factor", *f)?;
            }
        }
        WakeModelDef::LinearDecay {
            deficit,
            length_m,
            radius_factor,
            ..
        } => {
            if !(0.0..=1.0).contains(deficit) {
                return Err(invalid("linear_decay.deficit", deficit, "must lie in [0, 1]"));
            }
            positive("linear_decay.length_m", *length_m)?;
            if let Some(f) = radius_factor {
                positive("linear_decay.radius_factor", *f)?;
            }
        }
    }

    let rule = wm.superposition();
    let prefix = if wm.is_turbulence_model() { "ti_" } else { "ws_" };
    if wf_models::superposition::by_name(rule).is_err() {
        return Err(ValidationError::MissingReference {
            id: rule.to_string(),
            context: "wake model superposition".to_string(),
        });
    }
    if !rule.starts_with(prefix) {
        return Err(invalid(
            "wake model superposition",
            rule,
            "rule does not handle the variable of this wake model",
        ));
    }
    if let Some(lim) = wm.lim_low() {
        finite("wake_models.lim_low", lim)?;
        if !matches!(rule, "ws_linear" | "ws_linear_amb") {
            return Err(invalid(
                "wake_models.lim_low",
                lim,
                "only supported by the ws_linear rules",
            ));
        }
    }
    Ok(())
}

fn validate_grid(grid: &PointGridDef) -> Result<(), ValidationError> {
    finite("points.x_min", grid.x_min)?;
    finite("points.y_min", grid.y_min)?;
    if grid.x_max.is_nan() || grid.x_max < grid.x_min {
        return Err(invalid("points.x_max", grid.x_max, "must not be below x_min"));
    }
    if grid.y_max.is_nan() || grid.y_max < grid.y_min {
        return Err(invalid("points.y_max", grid.y_max, "must not be below y_min"));
    }
    positive("points.resolution_m", grid.resolution_m)?;
    positive("points.height_m", grid.height_m)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChunksDef, FarmDef, TurbineDef, WakeFrameDef};

    fn minimal() -> Case {
        Case {
            version: 1,
            name: "test".to_string(),
            turbine_types: vec![TurbineTypeDef::Idealized {
                name: "generic".to_string(),
                diameter_m: 100.0,
                hub_height_m: 90.0,
                rated_kw: 3000.0,
                ct: 0.8,
            }],
            farm: FarmDef {
                name: "farm".to_string(),
                turbines: vec![TurbineDef {
                    name: "T0".to_string(),
                    x: 0.0,
                    y: 0.0,
                    turbine_type: "generic".to_string(),
                    hub_height_m: None,
                    diameter_m: None,
                }],
            },
            states: StatesDef::Uniform {
                ws: 8.0,
                wd: 270.0,
                ti: 0.05,
                rho: 1.225,
            },
            post_models: vec![],
            point_models: vec![],
            rotor: RotorDef::Centre,
            wake_frame: WakeFrameDef::RotorWd,
            wake_models: vec![],
            partial_wakes: PartialWakesDef::RotorPoints,
            chunks: ChunksDef::default(),
            points: None,
        }
    }

    #[test]
    fn minimal_case_is_valid() {
        validate_case(&minimal()).unwrap();
    }

    #[test]
    fn unknown_turbine_type_is_reported() {
        let mut case = minimal();
        case.farm.turbines[0].turbine_type = "missing".to_string();
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn duplicate_turbine_names_are_reported() {
        let mut case = minimal();
        let t = case.farm.turbines[0].clone();
        case.farm.turbines.push(t);
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn speed_rule_on_turbulence_model_is_rejected() {
        let mut case = minimal();
        case.wake_models.push(WakeModelDef::CrespoHernandez {
            k: 0.04,
            superposition: Some("ws_linear".to_string()),
        });
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_rule_is_reported() {
        let mut case = minimal();
        case.wake_models.push(WakeModelDef::Jensen {
            k: 0.05,
            superposition: Some("ws_cubic".to_string()),
            lim_low: None,
        });
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn speed_limit_needs_linear_rule() {
        let mut case = minimal();
        case.wake_models.push(WakeModelDef::Jensen {
            k: 0.05,
            superposition: Some("ws_linear_amb".to_string()),
            lim_low: Some(0.5),
        });
        assert!(validate_case(&case).is_ok());

        case.wake_models[0] = WakeModelDef::Jensen {
            k: 0.05,
            superposition: Some("ws_quadratic".to_string()),
            lim_low: Some(0.5),
        };
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let mut case = minimal();
        case.version = 7;
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::UnsupportedVersion { version: 7 })
        ));
    }

    #[test]
    fn negative_wind_speed_is_rejected() {
        let mut case = minimal();
        case.states = StatesDef::Uniform {
            ws: -1.0,
            wd: 0.0,
            ti: 0.1,
            rho: 1.2,
        };
        assert!(validate_case(&case).is_err());
    }
}
