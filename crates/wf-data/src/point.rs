//! Per-chunk point data, indexed `(state, point)`.

use wf_core::{Var, WfError, WfResult};

use crate::table::{Coords, Field, VarTable, stack_cols, stack_rows};

/// Point data of one chunk of states and points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    states_i0: usize,
    points_i0: usize,
    vars: VarTable,
    points: Coords,
}

impl PointData {
    /// Create point data for the coordinates `points`, shape `(state, point)`.
    pub fn new(states_i0: usize, points_i0: usize, points: Coords) -> Self {
        let (n_states, n_points) = points.shape();
        Self {
            states_i0,
            points_i0,
            vars: VarTable::new("point data", n_states, n_points),
            points,
        }
    }

    pub fn n_states(&self) -> usize {
        self.points.nrows()
    }

    pub fn n_points(&self) -> usize {
        self.points.ncols()
    }

    pub fn states_i0(&self) -> usize {
        self.states_i0
    }

    pub fn points_i0(&self) -> usize {
        self.points_i0
    }

    pub fn points(&self) -> &Coords {
        &self.points
    }

    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VarTable {
        &mut self.vars
    }

    pub fn get(&self, var: Var) -> WfResult<&Field> {
        self.vars.get(var)
    }

    pub fn get_mut(&mut self, var: Var) -> WfResult<&mut Field> {
        self.vars.get_mut(var)
    }

    pub fn insert(&mut self, var: Var, values: Field) -> WfResult<()> {
        self.vars.insert(var, values)
    }

    pub fn contains(&self, var: Var) -> bool {
        self.vars.contains(var)
    }

    /// Ambient twin of `var`, looked up by name correspondence.
    pub fn ambient(&self, var: Var) -> WfResult<&Field> {
        self.vars.get(var.amb_or_err()?)
    }

    /// Stack chunks that cover consecutive point ranges of the same states.
    pub fn concat_points(parts: &[PointData]) -> WfResult<PointData> {
        let first = parts.first().ok_or_else(|| WfError::InvalidArg {
            what: "no point data chunks to concatenate".to_string(),
        })?;
        let points = stack_cols(&parts.iter().map(|p| &p.points).collect::<Vec<_>>())?;
        let tables: Vec<VarTable> = parts.iter().map(|p| p.vars.clone()).collect();
        Ok(PointData {
            states_i0: first.states_i0,
            points_i0: first.points_i0,
            vars: VarTable::concat_cols(&tables)?,
            points,
        })
    }

    /// Stack chunks that cover consecutive state ranges of the same points.
    pub fn concat_states(parts: &[PointData]) -> WfResult<PointData> {
        let first = parts.first().ok_or_else(|| WfError::InvalidArg {
            what: "no point data chunks to concatenate".to_string(),
        })?;
        let points = stack_rows(&parts.iter().map(|p| &p.points).collect::<Vec<_>>())?;
        let tables: Vec<VarTable> = parts.iter().map(|p| p.vars.clone()).collect();
        Ok(PointData {
            states_i0: first.states_i0,
            points_i0: first.points_i0,
            vars: VarTable::concat_rows(&tables)?,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn grid(n_states: usize, n_points: usize, x0: f64) -> PointData {
        let pts = Coords::from_fn(n_states, n_points, |_, p| {
            Vector3::new(x0 + p as f64, 0.0, 100.0)
        });
        PointData::new(0, 0, pts)
    }

    #[test]
    fn ambient_lookup_by_twin() {
        let mut pdata = grid(1, 3, 0.0);
        pdata.vars_mut().fill(Var::AmbWs, 7.0);
        assert_eq!(pdata.ambient(Var::Ws).unwrap()[(0, 2)], 7.0);
        assert!(pdata.ambient(Var::Ti).is_err());
        assert!(pdata.ambient(Var::D).is_err());
    }

    #[test]
    fn concat_points_joins_columns() {
        let mut a = grid(2, 2, 0.0);
        a.vars_mut().fill(Var::Ws, 1.0);
        let mut b = grid(2, 1, 10.0);
        b.vars_mut().fill(Var::Ws, 2.0);
        let c = PointData::concat_points(&[a, b]).unwrap();
        assert_eq!(c.n_points(), 3);
        assert_eq!(c.points()[(1, 2)].x, 10.0);
        assert_eq!(c.get(Var::Ws).unwrap()[(0, 2)], 2.0);
    }
}
