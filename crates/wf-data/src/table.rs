//! Named, shape-checked variable tables.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, Scalar, Vector3};
use wf_core::{Var, WfError, WfResult};

/// Dense `(state, column)` array of one variable.
pub type Field = DMatrix<f64>;
/// `(state, column)` array of 3-D coordinates.
pub type Coords = DMatrix<Vector3<f64>>;
/// `(state, column)` selection mask.
pub type Mask = DMatrix<bool>;

/// A mapping from variable to array with one fixed shape contract.
///
/// Inserting an array of any other shape fails with a dimension error, so
/// shape mistakes surface at the construction boundary rather than deep in
/// the numeric loop.
#[derive(Debug, Clone, PartialEq)]
pub struct VarTable {
    what: &'static str,
    rows: usize,
    cols: usize,
    data: BTreeMap<Var, Field>,
}

impl VarTable {
    pub fn new(what: &'static str, rows: usize, cols: usize) -> Self {
        Self {
            what,
            rows,
            cols,
            data: BTreeMap::new(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn insert(&mut self, var: Var, values: Field) -> WfResult<()> {
        if values.shape() != self.shape() {
            return Err(WfError::dimension(
                format!("{} variable '{}'", self.what, var),
                self.shape(),
                values.shape(),
            ));
        }
        self.data.insert(var, values);
        Ok(())
    }

    /// Insert a constant-valued array.
    pub fn fill(&mut self, var: Var, value: f64) {
        self.data
            .insert(var, Field::from_element(self.rows, self.cols, value));
    }

    pub fn get(&self, var: Var) -> WfResult<&Field> {
        self.data
            .get(&var)
            .ok_or_else(|| WfError::missing_data(var, self.what, self.data.keys()))
    }

    pub fn get_mut(&mut self, var: Var) -> WfResult<&mut Field> {
        let what = self.what;
        if !self.data.contains_key(&var) {
            return Err(WfError::missing_data(var, what, self.data.keys()));
        }
        self.data
            .get_mut(&var)
            .ok_or_else(|| WfError::missing_data(var, what, std::iter::empty::<Var>()))
    }

    /// Mutable access, inserting zeros first when absent.
    pub fn get_or_zeros(&mut self, var: Var) -> &mut Field {
        let (rows, cols) = self.shape();
        self.data
            .entry(var)
            .or_insert_with(|| Field::zeros(rows, cols))
    }

    pub fn contains(&self, var: Var) -> bool {
        self.data.contains_key(&var)
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.data.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, &Field)> {
        self.data.iter().map(|(v, f)| (*v, f))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy `var` into its ambient twin.
    pub fn copy_to_ambient(&mut self, var: Var) -> WfResult<()> {
        let amb = var.amb_or_err()?;
        let values = self.get(var)?.clone();
        self.data.insert(amb, values);
        Ok(())
    }

    /// Keep only the listed variables.
    pub fn retain(&mut self, keep: &[Var]) {
        self.data.retain(|v, _| keep.contains(v));
    }

    /// Stack tables of the same variable set along the state axis.
    pub fn concat_rows(parts: &[VarTable]) -> WfResult<VarTable> {
        Self::concat(parts, Axis::Rows)
    }

    /// Stack tables of the same variable set along the column axis.
    pub fn concat_cols(parts: &[VarTable]) -> WfResult<VarTable> {
        Self::concat(parts, Axis::Cols)
    }

    fn concat(parts: &[VarTable], axis: Axis) -> WfResult<VarTable> {
        let first = parts.first().ok_or_else(|| WfError::InvalidArg {
            what: "cannot concatenate zero tables".to_string(),
        })?;
        let mut out = match axis {
            Axis::Rows => VarTable::new(
                first.what,
                parts.iter().map(|p| p.rows).sum(),
                first.cols,
            ),
            Axis::Cols => VarTable::new(
                first.what,
                first.rows,
                parts.iter().map(|p| p.cols).sum(),
            ),
        };
        for var in first.vars() {
            let mut fields = Vec::with_capacity(parts.len());
            for part in parts {
                fields.push(part.get(var)?);
            }
            let stacked = match axis {
                Axis::Rows => stack_rows(&fields)?,
                Axis::Cols => stack_cols(&fields)?,
            };
            out.insert(var, stacked)?;
        }
        Ok(out)
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Cols,
}

/// Stack matrices vertically (along the state axis).
pub fn stack_rows<T: Scalar>(parts: &[&DMatrix<T>]) -> WfResult<DMatrix<T>> {
    let cols = parts.first().map_or(0, |p| p.ncols());
    if let Some(bad) = parts.iter().find(|p| p.ncols() != cols) {
        return Err(WfError::dimension(
            "row stacking",
            (bad.nrows(), cols),
            bad.shape(),
        ));
    }
    let rows: usize = parts.iter().map(|p| p.nrows()).sum();
    let mut offsets = Vec::with_capacity(parts.len());
    let mut acc = 0;
    for p in parts {
        offsets.push(acc);
        acc += p.nrows();
    }
    Ok(DMatrix::from_fn(rows, cols, |r, c| {
        let k = offsets.partition_point(|&o| o <= r) - 1;
        parts[k][(r - offsets[k], c)].clone()
    }))
}

/// Stack matrices horizontally (along the target axis).
pub fn stack_cols<T: Scalar>(parts: &[&DMatrix<T>]) -> WfResult<DMatrix<T>> {
    let rows = parts.first().map_or(0, |p| p.nrows());
    if let Some(bad) = parts.iter().find(|p| p.nrows() != rows) {
        return Err(WfError::dimension(
            "column stacking",
            (rows, bad.ncols()),
            bad.shape(),
        ));
    }
    let cols: usize = parts.iter().map(|p| p.ncols()).sum();
    let mut offsets = Vec::with_capacity(parts.len());
    let mut acc = 0;
    for p in parts {
        offsets.push(acc);
        acc += p.ncols();
    }
    Ok(DMatrix::from_fn(rows, cols, |r, c| {
        let k = offsets.partition_point(|&o| o <= c) - 1;
        parts[k][(r, c - offsets[k])].clone()
    }))
}
