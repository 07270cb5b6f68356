//! Rotor models: where a rotor disk is sampled and how samples are combined.

use nalgebra::{Vector2, Vector3};
use wf_core::{Tolerances, Var, WfError, WfResult, nearly_equal, uv2wd, wd2uv};
use wf_data::{Coords, FarmData, Field, VarTable};

use crate::traits::RotorModel;

/// Direction each rotor faces, shape `(state, turbine)`.
///
/// `YAW` when set, otherwise the ambient wind direction.
pub fn rotor_directions(fdata: &FarmData) -> WfResult<&Field> {
    if fdata.contains(Var::Yaw) {
        fdata.get(Var::Yaw)
    } else {
        fdata.get(Var::AmbWd)
    }
}

/// Place design points on every rotor disk.
///
/// Design points are given in units of the rotor radius as `(lateral,
/// vertical)` offsets in the rotor plane. Result shape is
/// `(state, turbine * n_points)`, turbine-major.
pub fn rotor_points(fdata: &FarmData, design_points: &[Vector2<f64>]) -> WfResult<Coords> {
    let n_states = fdata.n_states();
    let n_turbines = fdata.n_turbines();
    let n_p = design_points.len();
    let d = fdata.get(Var::D)?;
    let yaw = rotor_directions(fdata)?;

    let mut points = Coords::from_element(n_states, n_turbines * n_p, Vector3::zeros());
    for s in 0..n_states {
        for t in 0..n_turbines {
            let hub = fdata.hub(s, t);
            let r = 0.5 * d[(s, t)];
            let (nx, ny) = wd2uv(yaw[(s, t)], 1.0);
            let lat = Vector2::new(-ny, nx);
            for (p, dp) in design_points.iter().enumerate() {
                points[(s, t * n_p + p)] = Vector3::new(
                    hub.x + r * dp.x * lat.x,
                    hub.y + r * dp.x * lat.y,
                    hub.z + r * dp.y,
                );
            }
        }
    }
    Ok(points)
}

/// Reduce rotor point results to one value per `(state, turbine)`.
///
/// `WS` and `WD` are averaged as wind vectors and must come together;
/// the rotor equivalent wind speed `REWS` is the weighted mean of the
/// speed component along the rotor axis. Every other variable is a
/// weighted arithmetic mean.
pub fn aggregate_rpoint_results(
    fdata: &mut FarmData,
    results: &VarTable,
    weights: &[f64],
    targets: Option<&[usize]>,
) -> WfResult<()> {
    let n_states = fdata.n_states();
    let n_turbines = fdata.n_turbines();
    let n_p = weights.len();
    let total: f64 = weights.iter().sum();
    if n_p == 0 || !nearly_equal(total, 1.0, Tolerances::WEIGHTS) {
        return Err(WfError::InvalidArg {
            what: format!("rotor point weights must sum to 1, got {total} over {n_p} points"),
        });
    }

    // (state, turbine, first column) triples to reduce
    let blocks: Vec<(usize, usize, usize)> = match targets {
        None => {
            let expected = (n_states, n_turbines * n_p);
            if results.shape() != expected {
                return Err(WfError::dimension("rotor point results", expected, results.shape()));
            }
            (0..n_states)
                .flat_map(|s| (0..n_turbines).map(move |t| (s, t, t * n_p)))
                .collect()
        }
        Some(targets) => {
            if results.shape() != (n_states, n_p) || targets.len() != n_states {
                return Err(WfError::dimension(
                    "target rotor point results",
                    (n_states, n_p),
                    results.shape(),
                ));
            }
            if let Some(&t) = targets.iter().find(|&&t| t >= n_turbines) {
                return Err(WfError::IndexOob {
                    what: "target turbine",
                    index: t,
                    len: n_turbines,
                });
            }
            targets.iter().enumerate().map(|(s, &t)| (s, t, 0)).collect()
        }
    };

    let has_ws = results.contains(Var::Ws);
    let has_wd = results.contains(Var::Wd);
    if has_ws != has_wd {
        let var = if has_ws { Var::Wd } else { Var::Ws };
        return Err(WfError::missing_data(
            var,
            "rotor point results, WS and WD are averaged together",
            results.vars(),
        ));
    }

    if has_ws {
        let ws = results.get(Var::Ws)?;
        let wd = results.get(Var::Wd)?;
        let yaw = if fdata.contains(Var::Yaw) {
            Some(fdata.get(Var::Yaw)?.clone())
        } else {
            None
        };
        for var in [Var::Ws, Var::Wd, Var::Rews] {
            fdata.vars_mut().get_or_zeros(var);
        }
        for &(s, t, c0) in &blocks {
            let cols = c0..c0 + n_p;
            let wd_p: Vec<f64> = cols.clone().map(|c| wd[(s, c)]).collect();
            let ws_p: Vec<f64> = cols.map(|c| ws[(s, c)]).collect();
            let (u, v) = wf_core::vector_mean(&wd_p, &ws_p, weights);
            let mean_wd = if n_p == 1 { wd_p[0] } else { uv2wd(u, v) };
            let mean_ws = if n_p == 1 { ws_p[0] } else { u.hypot(v) };
            let axis = yaw.as_ref().map_or(mean_wd, |y| y[(s, t)]);
            let rews: f64 = wd_p
                .iter()
                .zip(&ws_p)
                .zip(weights)
                .map(|((&d, &w), &k)| k * w * (d - axis).to_radians().cos())
                .sum();
            fdata.set_at(Var::Ws, s, t, mean_ws)?;
            fdata.set_at(Var::Wd, s, t, mean_wd)?;
            fdata.set_at(Var::Rews, s, t, rews)?;
        }
    }

    for (var, field) in results.iter() {
        if matches!(var, Var::Ws | Var::Wd) {
            continue;
        }
        fdata.vars_mut().get_or_zeros(var);
        for &(s, t, c0) in &blocks {
            let mean: f64 = (0..n_p).map(|p| weights[p] * field[(s, c0 + p)]).sum();
            fdata.set_at(var, s, t, mean)?;
        }
    }
    Ok(())
}

/// A single point at the hub.
#[derive(Debug, Clone)]
pub struct CentreRotor {
    points: [Vector2<f64>; 1],
    weights: [f64; 1],
}

impl CentreRotor {
    pub fn new() -> Self {
        Self {
            points: [Vector2::zeros()],
            weights: [1.0],
        }
    }
}

impl Default for CentreRotor {
    fn default() -> Self {
        Self::new()
    }
}

impl RotorModel for CentreRotor {
    fn name(&self) -> &str {
        "centre"
    }

    fn design_points(&self) -> &[Vector2<f64>] {
        &self.points
    }

    fn rotor_point_weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Regular `n x n` grid over the rotor square, clipped to the disk.
///
/// Cell centres outside the unit circle are dropped; the remaining points
/// share equal weight.
#[derive(Debug, Clone)]
pub struct GridRotor {
    name: String,
    n: usize,
    points: Vec<Vector2<f64>>,
    weights: Vec<f64>,
}

impl GridRotor {
    pub fn new(n: usize) -> WfResult<Self> {
        if n == 0 {
            return Err(WfError::InvalidArg {
                what: "grid rotor needs at least one point per direction".to_string(),
            });
        }
        let delta = 2.0 / n as f64;
        let centres: Vec<f64> = (0..n).map(|i| -1.0 + (i as f64 + 0.5) * delta).collect();
        let mut points = Vec::with_capacity(n * n);
        for &y in &centres {
            for &z in &centres {
                if y * y + z * z <= 1.0 {
                    points.push(Vector2::new(y, z));
                }
            }
        }
        let w = 1.0 / points.len() as f64;
        let weights = vec![w; points.len()];
        Ok(Self {
            name: format!("grid{}", n * n),
            n,
            points,
            weights,
        })
    }

    /// Points per grid direction.
    pub fn n(&self) -> usize {
        self.n
    }
}

impl RotorModel for GridRotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn design_points(&self) -> &[Vector2<f64>] {
        &self.points
    }

    fn rotor_point_weights(&self) -> &[f64] {
        &self.weights
    }
}
