//! Wind farm layout.

use std::collections::HashSet;

use wf_core::units::Length;
use wf_core::{TurbineId, WfError, WfResult};

/// A turbine placed in the farm.
///
/// Hub height and rotor diameter default to the values of the turbine type
/// and can be overridden per turbine.
#[derive(Debug, Clone, PartialEq)]
pub struct Turbine {
    pub name: String,
    /// Easting and northing (m)
    pub xy: [f64; 2],
    /// Name of the turbine type
    pub turbine_type: String,
    pub hub_height: Option<Length>,
    pub diameter: Option<Length>,
}

impl Turbine {
    pub fn new(name: impl Into<String>, x: f64, y: f64, turbine_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xy: [x, y],
            turbine_type: turbine_type.into(),
            hub_height: None,
            diameter: None,
        }
    }

    pub fn with_hub_height(mut self, h: Length) -> Self {
        self.hub_height = Some(h);
        self
    }

    pub fn with_diameter(mut self, d: Length) -> Self {
        self.diameter = Some(d);
        self
    }
}

/// The farm: an ordered list of turbines, indexed by [`TurbineId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindFarm {
    pub name: String,
    turbines: Vec<Turbine>,
}

impl WindFarm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            turbines: Vec::new(),
        }
    }

    /// Add a turbine and return its ID.
    pub fn add_turbine(&mut self, turbine: Turbine) -> TurbineId {
        let id = TurbineId::from_index(self.turbines.len() as u32);
        self.turbines.push(turbine);
        id
    }

    pub fn turbines(&self) -> &[Turbine] {
        &self.turbines
    }

    pub fn turbine(&self, id: TurbineId) -> Option<&Turbine> {
        self.turbines.get(id.idx())
    }

    pub fn n_turbines(&self) -> usize {
        self.turbines.len()
    }

    /// Names must be unique and coordinates finite.
    pub fn validate(&self) -> WfResult<()> {
        if self.turbines.is_empty() {
            return Err(WfError::InvalidArg {
                what: format!("wind farm '{}' has no turbines", self.name),
            });
        }
        let mut names = HashSet::new();
        for t in &self.turbines {
            if !names.insert(t.name.as_str()) {
                return Err(WfError::InvalidArg {
                    what: format!("duplicate turbine name '{}'", t.name),
                });
            }
            if !t.xy.iter().all(|v| v.is_finite()) {
                return Err(WfError::NonFinite {
                    what: "turbine position",
                    value: if t.xy[0].is_finite() { t.xy[1] } else { t.xy[0] },
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::units::m;

    #[test]
    fn add_returns_sequential_ids() {
        let mut farm = WindFarm::new("row");
        let a = farm.add_turbine(Turbine::new("T0", 0.0, 0.0, "nrel5mw"));
        let b = farm.add_turbine(
            Turbine::new("T1", 500.0, 0.0, "nrel5mw").with_hub_height(m(100.0)),
        );
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(farm.turbine(b).unwrap().hub_height, Some(m(100.0)));
        farm.validate().unwrap();
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut farm = WindFarm::new("dup");
        farm.add_turbine(Turbine::new("T", 0.0, 0.0, "x"));
        farm.add_turbine(Turbine::new("T", 1.0, 0.0, "x"));
        assert!(farm.validate().is_err());
    }

    #[test]
    fn empty_farm_rejected() {
        assert!(WindFarm::new("none").validate().is_err());
    }
}
