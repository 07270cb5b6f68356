//! Per-chunk farm data, indexed `(state, turbine)`.

use nalgebra::{DMatrix, Vector3};
use wf_core::{Var, WfError, WfResult};

use crate::table::{Coords, Field, VarTable, stack_rows};

/// Farm data of one chunk of states.
///
/// Holds ambient (`AMB_*`) and waked variables, turbine hub positions
/// `(x, y, hub height)` and, once computed, the downwind processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmData {
    states_i0: usize,
    vars: VarTable,
    txyh: Coords,
    order: Option<DMatrix<usize>>,
}

impl FarmData {
    /// Create farm data for `txyh.nrows()` states starting at global state `states_i0`.
    pub fn new(states_i0: usize, txyh: Coords) -> Self {
        let (n_states, n_turbines) = txyh.shape();
        Self {
            states_i0,
            vars: VarTable::new("farm data", n_states, n_turbines),
            txyh,
            order: None,
        }
    }

    pub fn n_states(&self) -> usize {
        self.txyh.nrows()
    }

    pub fn n_turbines(&self) -> usize {
        self.txyh.ncols()
    }

    /// Global index of the first state of this chunk.
    pub fn states_i0(&self) -> usize {
        self.states_i0
    }

    /// Hub positions, shape `(state, turbine)`.
    pub fn txyh(&self) -> &Coords {
        &self.txyh
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

    /// Value of `var` at `(state, turbine)`.
    pub fn at(&self, var: Var, state: usize, turbine: usize) -> WfResult<f64> {
        let field = self.get(var)?;
        self.check_index(state, turbine)?;
        Ok(field[(state, turbine)])
    }

    /// Write `value` at `(state, turbine)`, creating the variable as zeros if needed.
    pub fn set_at(&mut self, var: Var, state: usize, turbine: usize, value: f64) -> WfResult<()> {
        self.check_index(state, turbine)?;
        self.vars.get_or_zeros(var)[(state, turbine)] = value;
        Ok(())
    }

    /// Store the downwind order.
    ///
    /// Every row must be a permutation of `0..n_turbines`.
    pub fn set_order(&mut self, order: DMatrix<usize>) -> WfResult<()> {
        let expected = (self.n_states(), self.n_turbines());
        if order.shape() != expected {
            return Err(WfError::dimension("turbine order", expected, order.shape()));
        }
        let n = self.n_turbines();
        let mut seen = vec![false; n];
        for s in 0..order.nrows() {
            seen.iter_mut().for_each(|b| *b = false);
            for oi in 0..n {
                let t = order[(s, oi)];
                if t >= n || seen[t] {
                    return Err(WfError::InvalidArg {
                        what: format!("turbine order of state {s} is not a permutation"),
                    });
                }
                seen[t] = true;
            }
        }
        self.order = Some(order);
        Ok(())
    }

    pub fn order(&self) -> WfResult<&DMatrix<usize>> {
        self.order.as_ref().ok_or_else(|| WfError::MissingInput {
            what: "turbine order has not been computed for this chunk".to_string(),
        })
    }

    /// Turbine at order position `oi` for every state.
    pub fn order_column(&self, oi: usize) -> WfResult<Vec<usize>> {
        let order = self.order()?;
        if oi >= order.ncols() {
            return Err(WfError::IndexOob {
                what: "order position",
                index: oi,
                len: order.ncols(),
            });
        }
        Ok(order.column(oi).iter().copied().collect())
    }

    /// Hub position of turbine `turbine` in state `state`.
    pub fn hub(&self, state: usize, turbine: usize) -> Vector3<f64> {
        self.txyh[(state, turbine)]
    }

    /// Stack chunk results along the state axis.
    pub fn concat_states(parts: &[FarmData]) -> WfResult<FarmData> {
        let first = parts.first().ok_or_else(|| WfError::InvalidArg {
            what: "no farm data chunks to concatenate".to_string(),
        })?;
        let txyh = stack_rows(&parts.iter().map(|p| &p.txyh).collect::<Vec<_>>())?;
        let tables: Vec<VarTable> = parts.iter().map(|p| p.vars.clone()).collect();
        let vars = VarTable::concat_rows(&tables)?;
        let order = if parts.iter().all(|p| p.order.is_some()) {
            let orders: Vec<&DMatrix<usize>> =
                parts.iter().filter_map(|p| p.order.as_ref()).collect();
            Some(stack_rows(&orders)?)
        } else {
            None
        };
        Ok(FarmData {
            states_i0: first.states_i0,
            vars,
            txyh,
            order,
        })
    }

    /// Copy of the rows `rows` (chunk-local indices), re-based at the matching global state.
    pub fn slice_states(&self, rows: std::ops::Range<usize>) -> WfResult<FarmData> {
        if rows.end > self.n_states() || rows.start > rows.end {
            return Err(WfError::IndexOob {
                what: "farm data state slice",
                index: rows.end,
                len: self.n_states(),
            });
        }
        let n = rows.len();
        let txyh = self.txyh.rows(rows.start, n).into_owned();
        let mut vars = VarTable::new("farm data", n, self.n_turbines());
        for (v, f) in self.vars.iter() {
            vars.insert(v, f.rows(rows.start, n).into_owned())?;
        }
        let order = self
            .order
            .as_ref()
            .map(|o| o.rows(rows.start, n).into_owned());
        Ok(FarmData {
            states_i0: self.states_i0 + rows.start,
            vars,
            txyh,
            order,
        })
    }

    fn check_index(&self, state: usize, turbine: usize) -> WfResult<()> {
        if state >= self.n_states() {
            return Err(WfError::IndexOob {
                what: "state",
                index: state,
                len: self.n_states(),
            });
        }
        if turbine >= self.n_turbines() {
            return Err(WfError::IndexOob {
                what: "turbine",
                index: turbine,
                len: self.n_turbines(),
            });
        }
        Ok(())
    }
}
