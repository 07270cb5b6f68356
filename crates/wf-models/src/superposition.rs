//! Wake superposition rules.
//!
//! Speed rules receive deficits relative to the inflow of the emitting
//! turbine and scale them with its rotor equivalent wind speed, waked
//! (`REWS`) or ambient (`AMB_REWS`). Turbulence rules work on added
//! turbulence intensity directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use wf_core::{Var, WfError, WfResult};
use wf_data::{FarmData, Field, Mask, check_per_state};

use crate::traits::Superposition;

/// Variable → rule mapping of one wake model.
#[derive(Clone, Default)]
pub struct SuperpositionTable {
    rules: BTreeMap<Var, Arc<dyn Superposition>>,
}

impl SuperpositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, var: Var, rule: Arc<dyn Superposition>) -> Self {
        self.rules.insert(var, rule);
        self
    }

    pub fn set(&mut self, var: Var, rule: Arc<dyn Superposition>) {
        self.rules.insert(var, rule);
    }

    /// Rule for `var`; a model that produces `var` without one is misconfigured.
    pub fn get(&self, model: &str, var: Var) -> WfResult<&Arc<dyn Superposition>> {
        self.rules.get(&var).ok_or_else(|| {
            WfError::missing_data(
                var,
                format!("superposition table of wake model '{model}'"),
                self.rules.keys(),
            )
        })
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.rules.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, &Arc<dyn Superposition>)> {
        self.rules.iter().map(|(v, r)| (*v, r))
    }
}

impl std::fmt::Debug for SuperpositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(v, r)| (v, r.name())))
            .finish()
    }
}

/// Look up a rule by its configuration name.
pub fn by_name(name: &str) -> WfResult<Arc<dyn Superposition>> {
    let rule: Arc<dyn Superposition> = match name {
        "ws_linear" => Arc::new(WsLinear::new(false)),
        "ws_linear_amb" => Arc::new(WsLinear::new(true)),
        "ws_quadratic" => Arc::new(WsQuadratic::new(false)),
        "ws_quadratic_amb" => Arc::new(WsQuadratic::new(true)),
        "ws_max" => Arc::new(WsMax::new(false)),
        "ws_max_amb" => Arc::new(WsMax::new(true)),
        "ti_linear" => Arc::new(TiLinear),
        "ti_quadratic" => Arc::new(TiQuadratic),
        "ti_max" => Arc::new(TiMax),
        other => {
            return Err(WfError::InvalidArg {
                what: format!("unknown superposition '{other}'"),
            });
        }
    };
    Ok(rule)
}

fn check_shapes(sel: &Mask, running: &Field, new: &Field) -> WfResult<()> {
    if running.shape() != new.shape() {
        return Err(WfError::dimension(
            "wake contribution",
            running.shape(),
            new.shape(),
        ));
    }
    if sel.shape() != running.shape() {
        return Err(WfError::dimension(
            "superposition selection",
            running.shape(),
            sel.shape(),
        ));
    }
    Ok(())
}

/// Rotor equivalent wind speed of the source turbine per state.
fn source_scale(fdata: &FarmData, source: &[usize], scale_amb: bool) -> WfResult<Vec<f64>> {
    check_per_state("source turbines", source, fdata.n_states())?;
    let rews = fdata.get(if scale_amb { Var::AmbRews } else { Var::Rews })?;
    Ok(source
        .iter()
        .enumerate()
        .map(|(s, &t)| rews[(s, t)])
        .collect())
}

/// Apply `combine(running, new, scale)` on every selected entry.
fn combine_selected<F>(
    sel: &Mask,
    running: &mut Field,
    new: &Field,
    scale: Option<&[f64]>,
    mut combine: F,
) where
    F: FnMut(f64, f64) -> f64,
{
    for s in 0..running.nrows() {
        let k = scale.map_or(1.0, |sc| sc[s]);
        for c in 0..running.ncols() {
            if sel[(s, c)] {
                running[(s, c)] = combine(running[(s, c)], k * new[(s, c)]);
            }
        }
    }
}

fn require_var(rule: &str, var: Var, allowed: &[Var]) -> WfResult<()> {
    if allowed.contains(&var) {
        Ok(())
    } else {
        Err(WfError::configuration(
            rule,
            format!("cannot superpose variable '{var}'"),
        ))
    }
}

/// Linear sum of scaled speed deficits.
#[derive(Debug, Clone)]
pub struct WsLinear {
    name: String,
    pub scale_amb: bool,
    /// Lower limit of the waked wind speed, if any.
    pub lim_low: Option<f64>,
}

impl WsLinear {
    pub fn new(scale_amb: bool) -> Self {
        let name = if scale_amb { "ws_linear_amb" } else { "ws_linear" };
        Self {
            name: name.to_string(),
            scale_amb,
            lim_low: None,
        }
    }

    pub fn with_lim_low(mut self, lim: f64) -> Self {
        self.lim_low = Some(lim);
        self
    }
}

impl Superposition for WsLinear {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_wakes_plus_wake(
        &self,
        fdata: &FarmData,
        source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(&self.name, var, &[Var::Ws, Var::Rews])?;
        check_shapes(sel, running, new)?;
        let scale = source_scale(fdata, source, self.scale_amb)?;
        combine_selected(sel, running, new, Some(&scale), |r, n| r + n);
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, amb: &Field, delta: &mut Field) -> WfResult<()> {
        if let Some(lim) = self.lim_low {
            delta.zip_apply(amb, |d, a| *d = d.max(lim - a));
        }
        Ok(())
    }
}

/// Root of the sum of squared scaled speed deficits.
#[derive(Debug, Clone)]
pub struct WsQuadratic {
    name: String,
    pub scale_amb: bool,
}

impl WsQuadratic {
    pub fn new(scale_amb: bool) -> Self {
        let name = if scale_amb {
            "ws_quadratic_amb"
        } else {
            "ws_quadratic"
        };
        Self {
            name: name.to_string(),
            scale_amb,
        }
    }
}

impl Superposition for WsQuadratic {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_wakes_plus_wake(
        &self,
        fdata: &FarmData,
        source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(&self.name, var, &[Var::Ws, Var::Rews])?;
        check_shapes(sel, running, new)?;
        let scale = source_scale(fdata, source, self.scale_amb)?;
        // running holds the sum of squares until finalization
        combine_selected(sel, running, new, Some(&scale), |r, n| r + n * n);
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, _amb: &Field, delta: &mut Field) -> WfResult<()> {
        delta.apply(|d| *d = -d.max(0.0).sqrt());
        Ok(())
    }
}

/// Strongest scaled speed deficit wins.
#[derive(Debug, Clone)]
pub struct WsMax {
    name: String,
    pub scale_amb: bool,
}

impl WsMax {
    pub fn new(scale_amb: bool) -> Self {
        let name = if scale_amb { "ws_max_amb" } else { "ws_max" };
        Self {
            name: name.to_string(),
            scale_amb,
        }
    }
}

impl Superposition for WsMax {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_wakes_plus_wake(
        &self,
        fdata: &FarmData,
        source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(&self.name, var, &[Var::Ws, Var::Rews])?;
        check_shapes(sel, running, new)?;
        let scale = source_scale(fdata, source, self.scale_amb)?;
        combine_selected(sel, running, new, Some(&scale), |r, n| {
            if n.abs() > r.abs() { n } else { r }
        });
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, _amb: &Field, _delta: &mut Field) -> WfResult<()> {
        Ok(())
    }
}

/// Linear sum of added turbulence.
#[derive(Debug, Clone, Copy)]
pub struct TiLinear;

impl Superposition for TiLinear {
    fn name(&self) -> &str {
        "ti_linear"
    }

    fn calc_wakes_plus_wake(
        &self,
        _fdata: &FarmData,
        _source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(self.name(), var, &[Var::Ti])?;
        check_shapes(sel, running, new)?;
        combine_selected(sel, running, new, None, |r, n| r + n);
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, _amb: &Field, _delta: &mut Field) -> WfResult<()> {
        Ok(())
    }
}

/// Added turbulence combined in quadrature with the ambient level.
#[derive(Debug, Clone, Copy)]
pub struct TiQuadratic;

impl Superposition for TiQuadratic {
    fn name(&self) -> &str {
        "ti_quadratic"
    }

    fn calc_wakes_plus_wake(
        &self,
        _fdata: &FarmData,
        _source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(self.name(), var, &[Var::Ti])?;
        check_shapes(sel, running, new)?;
        combine_selected(sel, running, new, None, |r, n| r + n * n);
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, amb: &Field, delta: &mut Field) -> WfResult<()> {
        if amb.shape() != delta.shape() {
            return Err(WfError::dimension(
                "ambient turbulence",
                delta.shape(),
                amb.shape(),
            ));
        }
        delta.zip_apply(amb, |d, a| *d = (a * a + *d).sqrt() - a);
        Ok(())
    }
}

/// Strongest added turbulence, combined in quadrature with the ambient level.
#[derive(Debug, Clone, Copy)]
pub struct TiMax;

impl Superposition for TiMax {
    fn name(&self) -> &str {
        "ti_max"
    }

    fn calc_wakes_plus_wake(
        &self,
        _fdata: &FarmData,
        _source: &[usize],
        sel: &Mask,
        var: Var,
        running: &mut Field,
        new: &Field,
    ) -> WfResult<()> {
        require_var(self.name(), var, &[Var::Ti])?;
        check_shapes(sel, running, new)?;
        combine_selected(sel, running, new, None, f64::max);
        Ok(())
    }

    fn calc_final_wake_delta(&self, _var: Var, amb: &Field, delta: &mut Field) -> WfResult<()> {
        if amb.shape() != delta.shape() {
            return Err(WfError::dimension(
                "ambient turbulence",
                delta.shape(),
                amb.shape(),
            ));
        }
        delta.zip_apply(amb, |d, a| *d = (a * a + *d * *d).sqrt() - a);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use proptest::prelude::*;
    use wf_data::Coords;

    fn fdata_with_rews(rews: &[f64]) -> FarmData {
        let n = rews.len();
        let mut fdata = FarmData::new(0, Coords::from_element(1, n, Vector3::zeros()));
        fdata
            .insert(Var::Rews, Field::from_row_slice(1, n, rews))
            .unwrap();
        fdata
            .insert(Var::AmbRews, Field::from_element(1, n, 10.0))
            .unwrap();
        fdata
    }

    #[test]
    fn linear_scales_with_source_rews() {
        let fdata = fdata_with_rews(&[8.0, 6.0]);
        let rule = WsLinear::new(false);
        let sel = Mask::from_element(1, 2, true);
        let mut running = Field::zeros(1, 2);
        let new = Field::from_element(1, 2, -0.1);
        rule.calc_wakes_plus_wake(&fdata, &[1], &sel, Var::Ws, &mut running, &new)
            .unwrap();
        assert!((running[(0, 0)] + 0.6).abs() < 1e-12);

        let amb_rule = WsLinear::new(true);
        let mut running = Field::zeros(1, 2);
        amb_rule
            .calc_wakes_plus_wake(&fdata, &[1], &sel, Var::Ws, &mut running, &new)
            .unwrap();
        assert!((running[(0, 1)] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn selection_restricts_update() {
        let fdata = fdata_with_rews(&[10.0, 10.0]);
        let sel = Mask::from_row_slice(1, 2, &[true, false]);
        let mut running = Field::zeros(1, 2);
        let new = Field::from_element(1, 2, -0.2);
        WsLinear::new(false)
            .calc_wakes_plus_wake(&fdata, &[0], &sel, Var::Ws, &mut running, &new)
            .unwrap();
        assert!((running[(0, 0)] + 2.0).abs() < 1e-12);
        assert_eq!(running[(0, 1)], 0.0);
    }

    #[test]
    fn quadratic_needs_running_sum() {
        let fdata = fdata_with_rews(&[10.0]);
        let rule = WsQuadratic::new(false);
        let sel = Mask::from_element(1, 1, true);
        let mut running = Field::zeros(1, 1);
        for d in [-0.3, -0.4] {
            rule.calc_wakes_plus_wake(
                &fdata,
                &[0],
                &sel,
                Var::Ws,
                &mut running,
                &Field::from_element(1, 1, d),
            )
            .unwrap();
        }
        rule.calc_final_wake_delta(Var::Ws, &Field::from_element(1, 1, 10.0), &mut running)
            .unwrap();
        assert!((running[(0, 0)] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn max_keeps_strongest() {
        let fdata = fdata_with_rews(&[10.0]);
        let rule = WsMax::new(false);
        let sel = Mask::from_element(1, 1, true);
        let mut running = Field::zeros(1, 1);
        for d in [-0.1, -0.3, -0.2] {
            rule.calc_wakes_plus_wake(
                &fdata,
                &[0],
                &sel,
                Var::Ws,
                &mut running,
                &Field::from_element(1, 1, d),
            )
            .unwrap();
        }
        assert!((running[(0, 0)] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn ti_quadratic_final_uses_ambient() {
        let fdata = fdata_with_rews(&[10.0]);
        let sel = Mask::from_element(1, 1, true);
        let mut running = Field::zeros(1, 1);
        TiQuadratic
            .calc_wakes_plus_wake(
                &fdata,
                &[0],
                &sel,
                Var::Ti,
                &mut running,
                &Field::from_element(1, 1, 0.08),
            )
            .unwrap();
        TiQuadratic
            .calc_final_wake_delta(Var::Ti, &Field::from_element(1, 1, 0.06), &mut running)
            .unwrap();
        assert!((running[(0, 0)] - 0.04).abs() < 1e-12);
    }

    #[test]
    fn lim_low_caps_deficit() {
        let rule = WsLinear::new(false).with_lim_low(0.0);
        let amb = Field::from_element(1, 1, 5.0);
        let mut delta = Field::from_element(1, 1, -7.0);
        rule.calc_final_wake_delta(Var::Ws, &amb, &mut delta).unwrap();
        assert_eq!(delta[(0, 0)], -5.0);
    }

    #[test]
    fn wrong_variable_is_configuration_error() {
        let fdata = fdata_with_rews(&[10.0]);
        let sel = Mask::from_element(1, 1, true);
        let mut running = Field::zeros(1, 1);
        let err = TiLinear
            .calc_wakes_plus_wake(
                &fdata,
                &[0],
                &sel,
                Var::Ws,
                &mut running,
                &Field::zeros(1, 1),
            )
            .unwrap_err();
        assert!(matches!(err, WfError::Configuration { .. }));
    }

    #[test]
    fn shape_mismatch_is_dimension_error() {
        let fdata = fdata_with_rews(&[10.0]);
        let sel = Mask::from_element(1, 1, true);
        let mut running = Field::zeros(1, 1);
        let err = WsLinear::new(false)
            .calc_wakes_plus_wake(&fdata, &[0], &sel, Var::Ws, &mut running, &Field::zeros(1, 2))
            .unwrap_err();
        assert!(matches!(err, WfError::Dimension { .. }));
    }

    #[test]
    fn registry_knows_all_names() {
        for name in [
            "ws_linear",
            "ws_linear_amb",
            "ws_quadratic",
            "ws_quadratic_amb",
            "ws_max",
            "ws_max_amb",
            "ti_linear",
            "ti_quadratic",
            "ti_max",
        ] {
            assert_eq!(by_name(name).unwrap().name(), name);
        }
        assert!(by_name("ws_product").is_err());
    }

    proptest! {
        #[test]
        fn linear_is_order_independent(
            a in prop::collection::vec(-0.5f64..0.0, 3),
            b in prop::collection::vec(-0.5f64..0.0, 3),
        ) {
            let fdata = fdata_with_rews(&[9.0, 7.0, 5.0]);
            let rule = WsLinear::new(false);
            let sel = Mask::from_element(1, 3, true);
            let fa = Field::from_row_slice(1, 3, &a);
            let fb = Field::from_row_slice(1, 3, &b);

            let mut ab = Field::zeros(1, 3);
            rule.calc_wakes_plus_wake(&fdata, &[0], &sel, Var::Ws, &mut ab, &fa).unwrap();
            rule.calc_wakes_plus_wake(&fdata, &[2], &sel, Var::Ws, &mut ab, &fb).unwrap();

            let mut ba = Field::zeros(1, 3);
            rule.calc_wakes_plus_wake(&fdata, &[2], &sel, Var::Ws, &mut ba, &fb).unwrap();
            rule.calc_wakes_plus_wake(&fdata, &[0], &sel, Var::Ws, &mut ba, &fa).unwrap();

            for c in 0..3 {
                prop_assert!((ab[(0, c)] - ba[(0, c)]).abs() < 1e-12);
            }
        }
    }
}
