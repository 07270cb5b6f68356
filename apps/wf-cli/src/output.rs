//! Result tables as CSV or JSON.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use wf_core::Var;
use wf_data::{FarmData, PointData, VarTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

#[derive(Serialize)]
struct FarmJson<'a> {
    states: &'a [String],
    turbines: &'a [String],
    /// Values per variable, outer index state.
    variables: BTreeMap<Var, Vec<Vec<f64>>>,
}

#[derive(Serialize)]
struct PointsJson<'a> {
    states: &'a [String],
    points: Vec<[f64; 3]>,
    variables: BTreeMap<Var, Vec<Vec<f64>>>,
}

fn nested(vars: &VarTable) -> BTreeMap<Var, Vec<Vec<f64>>> {
    vars.iter()
        .map(|(v, f)| {
            let rows = f
                .row_iter()
                .map(|r| r.iter().copied().collect())
                .collect();
            (v, rows)
        })
        .collect()
}

/// One line per `(state, turbine)`.
pub fn farm_csv(fdata: &FarmData, states: &[String], turbines: &[String]) -> String {
    let vars: Vec<Var> = fdata.vars().vars().collect();
    let mut out = String::from("state,turbine");
    for v in &vars {
        let _ = write!(out, ",{v}");
    }
    out.push('\n');
    for s in 0..fdata.n_states() {
        for t in 0..fdata.n_turbines() {
            let _ = write!(out, "{},{}", states[s], turbines[t]);
            for (_, f) in fdata.vars().iter() {
                let _ = write!(out, ",{}", f[(s, t)]);
            }
            out.push('\n');
        }
    }
    out
}

/// One line per `(state, point)`, with the point coordinates.
pub fn points_csv(pdata: &PointData, states: &[String]) -> String {
    let mut out = String::from("state,x,y,z");
    for v in pdata.vars().vars() {
        let _ = write!(out, ",{v}");
    }
    out.push('\n');
    for s in 0..pdata.n_states() {
        for p in 0..pdata.n_points() {
            let xyz = pdata.points()[(s, p)];
            let _ = write!(out, "{},{},{},{}", states[s], xyz.x, xyz.y, xyz.z);
            for (_, f) in pdata.vars().iter() {
                let _ = write!(out, ",{}", f[(s, p)]);
            }
            out.push('\n');
        }
    }
    out
}

pub fn farm_json(
    fdata: &FarmData,
    states: &[String],
    turbines: &[String],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FarmJson {
        states,
        turbines,
        variables: nested(fdata.vars()),
    })
}

pub fn points_json(pdata: &PointData, states: &[String]) -> serde_json::Result<String> {
    let points = (0..pdata.n_points())
        .map(|p| {
            let xyz = pdata.points()[(0, p)];
            [xyz.x, xyz.y, xyz.z]
        })
        .collect();
    serde_json::to_string_pretty(&PointsJson {
        states,
        points,
        variables: nested(pdata.vars()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_data::{Coords, Field, Vector3};

    fn two_turbines() -> FarmData {
        let txyh = Coords::from_fn(1, 2, |_, t| Vector3::new(500.0 * t as f64, 0.0, 90.0));
        let mut fdata = FarmData::new(0, txyh);
        fdata
            .insert(Var::Ws, Field::from_row_slice(1, 2, &[8.0, 6.5]))
            .unwrap();
        fdata.vars_mut().fill(Var::Ct, 0.8);
        fdata
    }

    #[test]
    fn farm_csv_has_one_line_per_turbine() {
        let csv = farm_csv(
            &two_turbines(),
            &["0".to_string()],
            &["A".to_string(), "B".to_string()],
        );
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "state,turbine,WS,CT");
        assert_eq!(lines[2], "0,B,6.5,0.8");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn farm_json_uses_variable_names() {
        let json = farm_json(&two_turbines(), &["0".to_string()], &["A".to_string(), "B".to_string()])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["variables"]["WS"][0][1], 6.5);
        assert_eq!(value["turbines"][1], "B");
    }
}
