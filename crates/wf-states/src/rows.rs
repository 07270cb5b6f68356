//! States given as explicit rows of ambient values.

use wf_core::{Var, WfError, WfResult, ensure_finite};
use wf_data::{FarmData, Field, PointData};

use crate::traits::{PointDataModel, States};

/// Ambient values of one state, horizontally uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateRow {
    pub ws: f64,
    pub wd: f64,
    pub ti: f64,
    pub rho: f64,
    pub weight: f64,
}

impl StateRow {
    fn validate(&self) -> WfResult<()> {
        ensure_finite(self.ws, "state wind speed")?;
        ensure_finite(self.wd, "state wind direction")?;
        ensure_finite(self.ti, "state turbulence intensity")?;
        ensure_finite(self.rho, "state air density")?;
        ensure_finite(self.weight, "state weight")?;
        if self.ws < 0.0 || self.ti < 0.0 || self.rho <= 0.0 || self.weight < 0.0 {
            return Err(WfError::InvalidArg {
                what: format!("non-physical state {self:?}"),
            });
        }
        Ok(())
    }
}

const OUTPUT_VARS: [Var; 4] = [Var::Ws, Var::Wd, Var::Ti, Var::Rho];

/// Write the rows of the chunk's states at every point.
fn fill_points(rows: &[StateRow], pdata: &mut PointData) -> WfResult<()> {
    let (n_states, n_points) = (pdata.n_states(), pdata.n_points());
    let i0 = pdata.states_i0();
    if i0 + n_states > rows.len() {
        return Err(WfError::IndexOob {
            what: "state",
            index: i0 + n_states - 1,
            len: rows.len(),
        });
    }
    let chunk = &rows[i0..i0 + n_states];
    let column = |f: fn(&StateRow) -> f64| Field::from_fn(n_states, n_points, |s, _| f(&chunk[s]));
    pdata.insert(Var::Ws, column(|r| r.ws))?;
    pdata.insert(Var::Wd, column(|r| r.wd))?;
    pdata.insert(Var::Ti, column(|r| r.ti))?;
    pdata.insert(Var::Rho, column(|r| r.rho))?;
    Ok(())
}

/// Per-state weights broadcast over turbines, normalized to sum 1.
fn row_weights(rows: &[StateRow], n_turbines: usize) -> WfResult<Field> {
    let total: f64 = rows.iter().map(|r| r.weight).sum();
    if total <= 0.0 {
        return Err(WfError::InvalidArg {
            what: "state weights sum to zero".to_string(),
        });
    }
    Ok(Field::from_fn(rows.len(), n_turbines, |s, _| {
        rows[s].weight / total
    }))
}

/// A single state.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformStates {
    row: [StateRow; 1],
}

impl UniformStates {
    pub fn new(ws: f64, wd: f64, ti: f64, rho: f64) -> WfResult<Self> {
        let row = StateRow {
            ws,
            wd,
            ti,
            rho,
            weight: 1.0,
        };
        row.validate()?;
        Ok(Self { row: [row] })
    }
}

impl PointDataModel for UniformStates {
    fn name(&self) -> &str {
        "uniform_states"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        OUTPUT_VARS.to_vec()
    }

    fn calculate(&self, _fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        fill_points(&self.row, pdata)
    }
}

impl States for UniformStates {
    fn size(&self) -> usize {
        1
    }

    fn raw_weights(&self, n_turbines: usize) -> WfResult<Field> {
        row_weights(&self.row, n_turbines)
    }
}

/// A table of states, e.g. a wind rose or a time series.
#[derive(Debug, Clone, PartialEq)]
pub struct StatesTable {
    rows: Vec<StateRow>,
    labels: Option<Vec<String>>,
    turbine_weights: Option<Field>,
}

impl StatesTable {
    pub fn new(rows: Vec<StateRow>) -> WfResult<Self> {
        if rows.is_empty() {
            return Err(WfError::InvalidArg {
                what: "states table has no rows".to_string(),
            });
        }
        for r in &rows {
            r.validate()?;
        }
        Ok(Self {
            rows,
            labels: None,
            turbine_weights: None,
        })
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> WfResult<Self> {
        if labels.len() != self.rows.len() {
            return Err(WfError::dimension(
                "state labels",
                (self.rows.len(), 1),
                (labels.len(), 1),
            ));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Explicit `(state, turbine)` weights, replacing the row weights.
    ///
    /// The turbine count is only known to the algorithm, so the shape is
    /// checked by [`States::weights`].
    pub fn with_turbine_weights(mut self, weights: Field) -> Self {
        self.turbine_weights = Some(weights);
        self
    }

    pub fn rows(&self) -> &[StateRow] {
        &self.rows
    }
}

impl PointDataModel for StatesTable {
    fn name(&self) -> &str {
        "states_table"
    }

    fn output_point_vars(&self) -> Vec<Var> {
        OUTPUT_VARS.to_vec()
    }

    fn calculate(&self, _fdata: &FarmData, pdata: &mut PointData) -> WfResult<()> {
        fill_points(&self.rows, pdata)
    }
}

impl States for StatesTable {
    fn size(&self) -> usize {
        self.rows.len()
    }

    fn index(&self) -> Option<Vec<String>> {
        self.labels.clone()
    }

    fn raw_weights(&self, n_turbines: usize) -> WfResult<Field> {
        match &self.turbine_weights {
            Some(w) => Ok(w.clone()),
            None => row_weights(&self.rows, n_turbines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use nalgebra::Vector3;
    use wf_data::Coords;

    fn rows(n: usize) -> Vec<StateRow> {
        (0..n)
            .map(|i| StateRow {
                ws: 5.0 + i as f64,
                wd: 10.0 * i as f64,
                ti: 0.05,
                rho: 1.225,
                weight: 1.0,
            })
            .collect()
    }

    fn empty_farm() -> FarmData {
        FarmData::new(0, Coords::from_element(1, 0, Vector3::zeros()))
    }

    #[test]
    fn chunk_reads_its_own_rows() {
        let states = StatesTable::new(rows(5)).unwrap();
        let mut pdata = PointData::new(2, 0, Coords::from_element(2, 3, Vector3::zeros()));
        states.calculate(&empty_farm(), &mut pdata).unwrap();
        let ws = pdata.get(Var::Ws).unwrap();
        assert_eq!(ws[(0, 2)], 7.0);
        assert_eq!(ws[(1, 0)], 8.0);
        assert_eq!(pdata.get(Var::Wd).unwrap()[(1, 1)], 30.0);
    }

    #[test]
    fn chunk_beyond_table_is_rejected() {
        let states = StatesTable::new(rows(2)).unwrap();
        let mut pdata = PointData::new(1, 0, Coords::from_element(2, 1, Vector3::zeros()));
        let err = states.calculate(&empty_farm(), &mut pdata).unwrap_err();
        assert!(matches!(err, WfError::IndexOob { .. }));
    }

    #[test]
    fn weights_are_normalized() {
        let states = StatesTable::new(rows(4)).unwrap();
        let w = states.weights(3).unwrap();
        assert_eq!(w.shape(), (4, 3));
        assert!((w.column(0).sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_weights_are_shape_checked() {
        let states = StatesTable::new(rows(4))
            .unwrap()
            .with_turbine_weights(Field::from_element(4, 2, 0.25));
        assert!(states.weights(2).is_ok());
        let err = states.weights(3).unwrap_err();
        assert!(matches!(err, WfError::Dimension { .. }));
    }

    #[test]
    fn labels_and_validation() {
        let states = StatesTable::new(rows(2))
            .unwrap()
            .with_labels(vec!["a".into(), "b".into()])
            .unwrap();
        assert_eq!(states.index().unwrap(), vec!["a", "b"]);
        assert!(StatesTable::new(rows(2)).unwrap().with_labels(vec![]).is_err());
        assert!(UniformStates::new(-1.0, 270.0, 0.05, 1.225).is_err());
        assert!(StatesTable::new(Vec::new()).is_err());
    }

    proptest! {
        #[test]
        fn row_weights_sum_to_one(ws in proptest::collection::vec(0.01f64..10.0, 1..12)) {
            let rows: Vec<StateRow> = ws
                .iter()
                .map(|&weight| StateRow { ws: 8.0, wd: 270.0, ti: 0.05, rho: 1.225, weight })
                .collect();
            let n = rows.len();
            let w = StatesTable::new(rows).unwrap().weights(2).unwrap();
            prop_assert_eq!(w.shape(), (n, 2));
            prop_assert!((w.column(1).sum() - 1.0).abs() < 1e-12);
        }
    }
}
