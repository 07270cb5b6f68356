//! Case file schema definitions.

use serde::{Deserialize, Serialize};

fn rho_std() -> f64 {
    wf_core::units::constants::RHO_STD_KGPM3
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub turbine_types: Vec<TurbineTypeDef>,
    pub farm: FarmDef,
    pub states: StatesDef,
    /// Models appended to the states (e.g. shear), applied to all ambient values.
    #[serde(default)]
    pub post_models: Vec<PointModelDef>,
    /// Models run on the waked point results.
    #[serde(default)]
    pub point_models: Vec<PointModelDef>,
    #[serde(default)]
    pub rotor: RotorDef,
    #[serde(default)]
    pub wake_frame: WakeFrameDef,
    #[serde(default)]
    pub wake_models: Vec<WakeModelDef>,
    #[serde(default)]
    pub partial_wakes: PartialWakesDef,
    #[serde(default)]
    pub chunks: ChunksDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<PointGridDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurbineTypeDef {
    /// Tabulated curves.
    PCtCurve {
        name: String,
        diameter_m: f64,
        hub_height_m: f64,
        ws: Vec<f64>,
        p_kw: Vec<f64>,
        ct: Vec<f64>,
        #[serde(default = "rho_std")]
        rho_ref: f64,
    },
    /// Generic cubic power curve.
    Idealized {
        name: String,
        diameter_m: f64,
        hub_height_m: f64,
        rated_kw: f64,
        ct: f64,
    },
}

impl TurbineTypeDef {
    pub fn name(&self) -> &str {
        match self {
            TurbineTypeDef::PCtCurve { name, .. } | TurbineTypeDef::Idealized { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmDef {
    pub name: String,
    #[serde(default)]
    pub turbines: Vec<TurbineDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurbineDef {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub turbine_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_height_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_m: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatesDef {
    Uniform {
        ws: f64,
        wd: f64,
        ti: f64,
        #[serde(default = "rho_std")]
        rho: f64,
    },
    Table {
        rows: Vec<StateRowDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateRowDef {
    pub ws: f64,
    pub wd: f64,
    pub ti: f64,
    #[serde(default = "rho_std")]
    pub rho: f64,
    #[serde(default = "one")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointModelDef {
    PowerLawShear { ref_height_m: f64, alpha: f64 },
    PowerDensity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RotorDef {
    #[default]
    Centre,
    Grid {
        n: usize,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WakeFrameDef {
    #[default]
    RotorWd,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WakeModelDef {
    Jensen {
        k: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superposition: Option<String>,        /// Lower limit of the waked wind speed, `ws_linear` rules only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lim_low: Option<f64>,
    },
    Bastankhah2014 {
        k: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sbeta_factor: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superposition: Option<String>,        /// Lower limit of the waked wind speed, `ws_linear` rules only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lim_low: Option<f64>,
    },
    LinearDecay {
        deficit: f64,
        length_m: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius_factor: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superposition: Option<String>,        /// Lower limit of the waked wind speed, `ws_linear` rules only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lim_low: Option<f64>,
    },
    CrespoHernandez {
        k: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superposition: Option<String>,
    },
}

impl WakeModelDef {
    /// Configured superposition name, or the model's default.
    pub fn superposition(&self) -> &str {
        match self {
            WakeModelDef::Jensen { superposition, .. }
            | WakeModelDef::Bastankhah2014 { superposition, .. }
            | WakeModelDef::LinearDecay { superposition, .. } => {
                superposition.as_deref().unwrap_or("ws_linear")
            }
            WakeModelDef::CrespoHernandez { superposition, .. } => {
                superposition.as_deref().unwrap_or("ti_quadratic")
            }
        }
    }

    pub fn lim_low(&self) -> Option<f64> {
        match self {
            WakeModelDef::Jensen { lim_low, .. }
            | WakeModelDef::Bastankhah2014 { lim_low, .. }
            | WakeModelDef::LinearDecay { lim_low, .. } => *lim_low,
            WakeModelDef::CrespoHernandez { .. } => None,
        }
    }

    pub fn is_turbulence_model(&self) -> bool {
        matches!(self, WakeModelDef::CrespoHernandez { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartialWakesDef {
    #[default]
    RotorPoints,
    DistSliced {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunksDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
}

/// Horizontal grid of evaluation points at one height.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointGridDef {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub resolution_m: f64,
    pub height_m: f64,
}
