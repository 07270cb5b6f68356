//! The closed set of variables carried by farm and point data.

use core::fmt;
use core::str::FromStr;

use crate::WfError;

/// Meteorological and farm variables.
///
/// Every waked variable that has an undisturbed counterpart maps to an
/// `Amb*` twin through [`Var::amb`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Var {
    /// Wind speed (m/s)
    #[cfg_attr(feature = "serde", serde(rename = "WS"))]
    Ws,
    /// Wind direction, meteorological degrees
    #[cfg_attr(feature = "serde", serde(rename = "WD"))]
    Wd,
    /// Turbulence intensity
    #[cfg_attr(feature = "serde", serde(rename = "TI"))]
    Ti,
    /// Air density (kg/m3)
    #[cfg_attr(feature = "serde", serde(rename = "RHO"))]
    Rho,
    /// Rotor yaw direction, meteorological degrees
    #[cfg_attr(feature = "serde", serde(rename = "YAW"))]
    Yaw,
    /// Thrust coefficient
    #[cfg_attr(feature = "serde", serde(rename = "CT"))]
    Ct,
    /// Power (kW)
    #[cfg_attr(feature = "serde", serde(rename = "P"))]
    P,
    /// Rotor equivalent wind speed (m/s)
    #[cfg_attr(feature = "serde", serde(rename = "REWS"))]
    Rews,
    /// Wind power density (W/m2)
    #[cfg_attr(feature = "serde", serde(rename = "WPD"))]
    Wpd,
    /// Rotor diameter (m)
    #[cfg_attr(feature = "serde", serde(rename = "D"))]
    D,
    /// Hub height (m)
    #[cfg_attr(feature = "serde", serde(rename = "H"))]
    H,
    /// Statistical weight of a (state, turbine) pair
    #[cfg_attr(feature = "serde", serde(rename = "WEIGHT"))]
    Weight,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_WS"))]
    AmbWs,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_WD"))]
    AmbWd,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_TI"))]
    AmbTi,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_RHO"))]
    AmbRho,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_YAW"))]
    AmbYaw,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_CT"))]
    AmbCt,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_P"))]
    AmbP,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_REWS"))]
    AmbRews,
    #[cfg_attr(feature = "serde", serde(rename = "AMB_WPD"))]
    AmbWpd,
}

impl Var {
    pub const ALL: [Var; 21] = [
        Var::Ws,
        Var::Wd,
        Var::Ti,
        Var::Rho,
        Var::Yaw,
        Var::Ct,
        Var::P,
        Var::Rews,
        Var::Wpd,
        Var::D,
        Var::H,
        Var::Weight,
        Var::AmbWs,
        Var::AmbWd,
        Var::AmbTi,
        Var::AmbRho,
        Var::AmbYaw,
        Var::AmbCt,
        Var::AmbP,
        Var::AmbRews,
        Var::AmbWpd,
    ];

    /// The ambient twin of a waked variable.
    pub fn amb(self) -> Option<Var> {
        match self {
            Var::Ws => Some(Var::AmbWs),
            Var::Wd => Some(Var::AmbWd),
            Var::Ti => Some(Var::AmbTi),
            Var::Rho => Some(Var::AmbRho),
            Var::Yaw => Some(Var::AmbYaw),
            Var::Ct => Some(Var::AmbCt),
            Var::P => Some(Var::AmbP),
            Var::Rews => Some(Var::AmbRews),
            Var::Wpd => Some(Var::AmbWpd),
            _ => None,
        }
    }

    /// Ambient twin or an error naming the variable.
    pub fn amb_or_err(self) -> Result<Var, WfError> {
        self.amb().ok_or_else(|| {
            WfError::missing_data(
                self,
                "ambient variable mapping",
                Var::ALL.iter().filter(|v| v.amb().is_some()),
            )
        })
    }

    pub fn is_ambient(self) -> bool {
        matches!(
            self,
            Var::AmbWs
                | Var::AmbWd
                | Var::AmbTi
                | Var::AmbRho
                | Var::AmbYaw
                | Var::AmbCt
                | Var::AmbP
                | Var::AmbRews
                | Var::AmbWpd
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Var::Ws => "WS",
            Var::Wd => "WD",
            Var::Ti => "TI",
            Var::Rho => "RHO",
            Var::Yaw => "YAW",
            Var::Ct => "CT",
            Var::P => "P",
            Var::Rews => "REWS",
            Var::Wpd => "WPD",
            Var::D => "D",
            Var::H => "H",
            Var::Weight => "WEIGHT",
            Var::AmbWs => "AMB_WS",
            Var::AmbWd => "AMB_WD",
            Var::AmbTi => "AMB_TI",
            Var::AmbRho => "AMB_RHO",
            Var::AmbYaw => "AMB_YAW",
            Var::AmbCt => "AMB_CT",
            Var::AmbP => "AMB_P",
            Var::AmbRews => "AMB_REWS",
            Var::AmbWpd => "AMB_WPD",
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Var {
    type Err = WfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Var::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| WfError::InvalidArg {
                what: format!("unknown variable '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amb_twins_are_ambient() {
        for v in Var::ALL {
            if let Some(a) = v.amb() {
                assert!(a.is_ambient(), "{v} -> {a}");
                assert!(!v.is_ambient());
            }
        }
    }

    #[test]
    fn parse_round_trip() {
        for v in Var::ALL {
            assert_eq!(v.as_str().parse::<Var>().unwrap(), v);
        }
        assert_eq!("amb_ws".parse::<Var>().unwrap(), Var::AmbWs);
        assert!("XYZ".parse::<Var>().is_err());
    }

    #[test]
    fn no_twin_for_geometry() {
        assert_eq!(Var::D.amb(), None);
        assert!(Var::Weight.amb_or_err().is_err());
        assert_eq!(Var::Ws.amb_or_err().unwrap(), Var::AmbWs);
    }
}
