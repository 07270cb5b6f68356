//! Turbine types.

use wf_core::units::{Density, Length, constants::RHO_STD_KGPM3, in_kgpm3, in_m};
use wf_core::{Var, WfError, WfResult, interp_linear};
use wf_data::FarmData;

use crate::traits::TurbineType;

/// Tabulated power and thrust curves.
///
/// Curves are evaluated at the rotor equivalent wind speed by linear
/// interpolation and are zero outside the tabulated range. Power scales
/// with `RHO / rho_ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct PCtCurve {
    name: String,
    diameter: Length,
    hub_height: Length,
    ws: Vec<f64>,
    p_kw: Vec<f64>,
    ct: Vec<f64>,
    /// Reference density of the power curve (kg/m3)
    pub rho_ref: f64,
}

impl PCtCurve {
    pub fn new(
        name: impl Into<String>,
        diameter: Length,
        hub_height: Length,
        ws: Vec<f64>,
        p_kw: Vec<f64>,
        ct: Vec<f64>,
    ) -> WfResult<Self> {
        let name = name.into();
        if ws.len() < 2 || p_kw.len() != ws.len() || ct.len() != ws.len() {
            return Err(WfError::InvalidArg {
                what: format!(
                    "turbine type '{name}': curves need equal length >= 2 (ws={}, P={}, ct={})",
                    ws.len(),
                    p_kw.len(),
                    ct.len()
                ),
            });
        }
        if ws.windows(2).any(|w| w[1] < w[0]) {
            return Err(WfError::InvalidArg {
                what: format!("turbine type '{name}': wind speeds must be ascending"),
            });
        }
        if in_m(diameter) <= 0.0 {
            return Err(WfError::InvalidArg {
                what: format!("turbine type '{name}': diameter must be positive"),
            });
        }
        Ok(Self {
            name,
            diameter,
            hub_height,
            ws,
            p_kw,
            ct,
            rho_ref: RHO_STD_KGPM3,
        })
    }

    pub fn with_rho_ref(mut self, rho: Density) -> Self {
        self.rho_ref = in_kgpm3(rho);
        self
    }

    /// Generic curve: cut-in 3 m/s, rated 12 m/s, cut-out 25 m/s.
    ///
    /// Power grows with the cube of the wind speed below rated; the thrust
    /// coefficient is `ct` below rated and falls off as `(12 / ws)^3` above.
    pub fn idealized(
        name: impl Into<String>,
        diameter: Length,
        hub_height: Length,
        rated_kw: f64,
        ct: f64,
    ) -> WfResult<Self> {
        let (cut_in, rated, cut_out) = (3.0, 12.0, 25.0);
        let mut ws = Vec::new();
        let mut p = Vec::new();
        let mut c = Vec::new();
        let mut v: f64 = cut_in;
        while v <= cut_out + 1e-9 {
            ws.push(v);
            if v < rated {
                let f = (v.powi(3) - cut_in.powi(3)) / (rated.powi(3) - cut_in.powi(3));
                p.push(rated_kw * f);
                c.push(ct);
            } else {
                p.push(rated_kw);
                c.push(ct * (rated / v).powi(3));
            }
            v += 0.5;
        }
        Self::new(name, diameter, hub_height, ws, p, c)
    }

    pub fn power_kw(&self, ws: f64, rho: f64) -> f64 {
        interp_linear(&self.ws, &self.p_kw, ws).unwrap_or(0.0) * rho / self.rho_ref
    }

    pub fn thrust_coefficient(&self, ws: f64) -> f64 {
        interp_linear(&self.ws, &self.ct, ws).unwrap_or(0.0)
    }
}

impl TurbineType for PCtCurve {
    fn name(&self) -> &str {
        &self.name
    }

    fn diameter(&self) -> Length {
        self.diameter
    }

    fn hub_height(&self) -> Length {
        self.hub_height
    }

    fn calculate(&self, fdata: &mut FarmData, pairs: &[(usize, usize)]) -> WfResult<()> {
        let ws_var = if fdata.contains(Var::Rews) {
            Var::Rews
        } else {
            Var::Ws
        };
        let has_rho = fdata.contains(Var::Rho);
        let mut results = Vec::with_capacity(pairs.len());
        for &(s, t) in pairs {
            let v = fdata.at(ws_var, s, t)?;
            let r = if has_rho {
                fdata.at(Var::Rho, s, t)?
            } else {
                self.rho_ref
            };
            results.push((s, t, self.thrust_coefficient(v), self.power_kw(v, r)));
        }
        fdata.vars_mut().get_or_zeros(Var::Ct);
        fdata.vars_mut().get_or_zeros(Var::P);
        for (s, t, ct, p) in results {
            fdata.set_at(Var::Ct, s, t, ct)?;
            fdata.set_at(Var::P, s, t, p)?;
        }
        Ok(())
    }
}
