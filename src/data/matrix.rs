// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Masked 2-D data matrix.
//!
//! [`DataMatrix`] keeps the numeric values and the boolean mask as an
//! explicit pair of parallel arrays with identical shape. The matrix only
//! tracks the mask; aggregation callers decide what masked means. A stack
//! of previously pushed masks supports temporary override and restore.

use ndarray::{s, Array2, ArrayView1, Axis};

use crate::core::error::{DataError, Result};
use crate::core::setas::{ColumnRoles, Role};

/// A numeric matrix with one boolean mask flag per element.
#[derive(Debug, Clone, Default)]
pub struct DataMatrix {
    values: Array2<f64>,
    mask: Array2<bool>,
    mask_stack: Vec<Array2<bool>>,
}

/// A tagged read-only view of one data row.
///
/// Carries the row index and the owning [`ColumnRoles`] so that role
/// accessors ("this row's x value") work directly on the view.
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    /// Index of this row within the owning matrix
    pub index: usize,
    values: ArrayView1<'a, f64>,
    mask: ArrayView1<'a, bool>,
    roles: &'a ColumnRoles,
}

impl<'a> RowView<'a> {
    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-column row.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of one cell.
    pub fn get(&self, column: usize) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Mask flag of one cell.
    pub fn is_masked(&self, column: usize) -> bool {
        self.mask.get(column).copied().unwrap_or(false)
    }

    /// True when any cell in the row is masked.
    pub fn any_masked(&self) -> bool {
        self.mask.iter().any(|m| *m)
    }

    /// The row values as a slice-compatible iterator.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Values of every column carrying `role`, in column order.
    pub fn role_values(&self, role: Role) -> Vec<f64> {
        self.roles
            .get(role)
            .indices()
            .into_iter()
            .filter_map(|ix| self.get(ix))
            .collect()
    }

    /// This row's x value, if an x column is assigned.
    pub fn x(&self) -> Option<f64> {
        self.roles.xcol().and_then(|ix| self.get(ix))
    }

    /// This row's y values.
    pub fn y(&self) -> Vec<f64> {
        self.role_values(Role::Y)
    }

    /// This row's z values.
    pub fn z(&self) -> Vec<f64> {
        self.role_values(Role::Z)
    }
}

impl DataMatrix {
    /// Create an empty (0 x 0) matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a value array with an all-clear mask.
    pub fn from_array(values: Array2<f64>) -> Self {
        let mask = Array2::from_elem(values.raw_dim(), false);
        Self {
            values,
            mask,
            mask_stack: Vec::new(),
        }
    }

    /// Wrap a value array together with an explicit mask.
    pub fn with_mask(values: Array2<f64>, mask: Array2<bool>) -> Result<Self> {
        if values.dim() != mask.dim() {
            return Err(DataError::type_mismatch(
                format!("mask of shape {:?}", values.dim()),
                format!("shape {:?}", mask.dim()),
            ));
        }
        Ok(Self {
            values,
            mask,
            mask_stack: Vec::new(),
        })
    }

    /// Matrix shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// The value array.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Mutable access to the value array (shape-preserving edits only).
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    /// The mask array.
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Mutable access to the mask array.
    pub fn mask_mut(&mut self) -> &mut Array2<bool> {
        &mut self.mask
    }

    /// Replace the whole mask, checking the shape invariant.
    pub fn set_mask(&mut self, mask: Array2<bool>) -> Result<()> {
        if mask.dim() != self.values.dim() {
            return Err(DataError::type_mismatch(
                format!("mask of shape {:?}", self.values.dim()),
                format!("shape {:?}", mask.dim()),
            ));
        }
        self.mask = mask;
        Ok(())
    }

    /// Set every mask flag to `flag`.
    pub fn mask_all(&mut self, flag: bool) {
        self.mask.fill(flag);
    }

    /// A tagged view of row `i`.
    pub fn row<'a>(&'a self, i: usize, roles: &'a ColumnRoles) -> Result<RowView<'a>> {
        if i >= self.n_rows() {
            return Err(DataError::index_out_of_range(i, self.n_rows()));
        }
        Ok(RowView {
            index: i,
            values: self.values.row(i),
            mask: self.mask.row(i),
            roles,
        })
    }

    /// Iterate over tagged row views.
    pub fn rows<'a>(&'a self, roles: &'a ColumnRoles) -> impl Iterator<Item = RowView<'a>> {
        (0..self.n_rows()).map(move |i| RowView {
            index: i,
            values: self.values.row(i),
            mask: self.mask.row(i),
            roles,
        })
    }

    /// Values of column `j`.
    pub fn column(&self, j: usize) -> Result<Vec<f64>> {
        if j >= self.n_cols() {
            return Err(DataError::index_out_of_range(j, self.n_cols()));
        }
        Ok(self.values.column(j).to_vec())
    }

    // ------------------------------------------------------------------
    // Mask stack
    // ------------------------------------------------------------------

    /// Save the current mask and install `new` (or clear when `None`).
    pub fn push_mask(&mut self, new: Option<Array2<bool>>) -> Result<()> {
        let replacement = match new {
            Some(mask) => {
                if mask.dim() != self.values.dim() {
                    return Err(DataError::type_mismatch(
                        format!("mask of shape {:?}", self.values.dim()),
                        format!("shape {:?}", mask.dim()),
                    ));
                }
                mask
            }
            None => Array2::from_elem(self.values.raw_dim(), false),
        };
        self.mask_stack.push(std::mem::replace(&mut self.mask, replacement));
        Ok(())
    }

    /// Restore the most recently pushed mask.
    ///
    /// Popping past the sentinel leaves the matrix unmasked.
    pub fn pop_mask(&mut self) {
        match self.mask_stack.pop() {
            Some(previous) => self.mask = previous,
            None => self.mask.fill(false),
        }
    }

    /// Mask every row failing `predicate`.
    ///
    /// With `reset` the previous mask is discarded first; otherwise the new
    /// row mask ORs into the existing one.
    pub fn filter_rows<F>(&mut self, roles: &ColumnRoles, reset: bool, predicate: F)
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        let mut failing = Vec::new();
        for row in self.rows(roles) {
            if !predicate(&row) {
                failing.push(row.index);
            }
        }
        if reset {
            self.mask.fill(false);
        }
        for i in failing {
            self.mask.row_mut(i).fill(true);
        }
    }

    /// Apply `func` to every row and use the result to set the row's mask.
    ///
    /// A true test masks the row; a false test unmasks it, unless
    /// `cumulative` is set, in which case the existing flag is left alone.
    /// `invert` flips the test.
    pub fn set_mask_by<F>(&mut self, roles: &ColumnRoles, invert: bool, cumulative: bool, func: F)
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        let mut outcomes = Vec::with_capacity(self.n_rows());
        for row in self.rows(roles) {
            outcomes.push(func(&row) ^ invert);
        }
        for (i, masked) in outcomes.into_iter().enumerate() {
            if masked {
                self.mask.row_mut(i).fill(true);
            } else if !cumulative {
                self.mask.row_mut(i).fill(false);
            }
        }
    }

    // ------------------------------------------------------------------
    // Physical compaction
    // ------------------------------------------------------------------

    /// Physically remove every row containing a masked element.
    pub fn delete_masked_rows(&mut self) {
        let keep: Vec<usize> = (0..self.n_rows())
            .filter(|&i| !self.mask.row(i).iter().any(|m| *m))
            .collect();
        self.values = self.values.select(Axis(0), &keep);
        self.mask = self.mask.select(Axis(0), &keep);
    }

    /// Physically remove every column containing a masked element.
    ///
    /// Returns the indices of the removed columns so the caller can edit
    /// headers and roles in lock-step.
    pub fn delete_masked_columns(&mut self) -> Vec<usize> {
        let removed: Vec<usize> = (0..self.n_cols())
            .filter(|&j| self.mask.column(j).iter().any(|m| *m))
            .collect();
        let keep: Vec<usize> = (0..self.n_cols()).filter(|j| !removed.contains(j)).collect();
        self.values = self.values.select(Axis(1), &keep);
        self.mask = self.mask.select(Axis(1), &keep);
        removed
    }

    // ------------------------------------------------------------------
    // Structural primitives
    // ------------------------------------------------------------------

    /// Grow the matrix to at least `rows` rows, zero-filling new cells.
    pub fn grow_rows(&mut self, rows: usize) {
        let (r, c) = self.shape();
        if rows <= r {
            return;
        }
        let mut values = Array2::zeros((rows, c));
        let mut mask = Array2::from_elem((rows, c), false);
        values.slice_mut(s![..r, ..]).assign(&self.values);
        mask.slice_mut(s![..r, ..]).assign(&self.mask);
        self.values = values;
        self.mask = mask;
    }

    /// Insert a column of values at `index` (clamped to the width).
    ///
    /// The column length must equal the row count unless the matrix is
    /// empty, in which case the column defines the row count.
    pub fn insert_column(&mut self, index: usize, column: &[f64]) -> Result<()> {
        let (r, c) = self.shape();
        if r == 0 && c == 0 {
            let values =
                Array2::from_shape_fn((column.len(), 1), |(i, _)| column[i]);
            self.mask = Array2::from_elem(values.raw_dim(), false);
            self.values = values;
            return Ok(());
        }
        if column.len() != r {
            return Err(DataError::type_mismatch(
                format!("a column of {r} values"),
                format!("{} values", column.len()),
            ));
        }
        let index = index.min(c);
        self.values = Array2::from_shape_fn((r, c + 1), |(i, j)| {
            if j < index {
                self.values[(i, j)]
            } else if j == index {
                column[i]
            } else {
                self.values[(i, j - 1)]
            }
        });
        self.mask = Array2::from_shape_fn((r, c + 1), |(i, j)| {
            if j < index {
                self.mask[(i, j)]
            } else if j == index {
                false
            } else {
                self.mask[(i, j - 1)]
            }
        });
        Ok(())
    }

    /// Overwrite the values of column `index`.
    pub fn replace_column(&mut self, index: usize, column: &[f64]) -> Result<()> {
        let (r, c) = self.shape();
        if index >= c {
            return Err(DataError::index_out_of_range(index, c));
        }
        if column.len() != r {
            return Err(DataError::type_mismatch(
                format!("a column of {r} values"),
                format!("{} values", column.len()),
            ));
        }
        for (i, v) in column.iter().enumerate() {
            self.values[(i, index)] = *v;
            self.mask[(i, index)] = false;
        }
        Ok(())
    }

    /// Remove column `index`.
    pub fn remove_column(&mut self, index: usize) -> Result<()> {
        let c = self.n_cols();
        if index >= c {
            return Err(DataError::index_out_of_range(index, c));
        }
        let keep: Vec<usize> = (0..c).filter(|&j| j != index).collect();
        self.values = self.values.select(Axis(1), &keep);
        self.mask = self.mask.select(Axis(1), &keep);
        Ok(())
    }

    /// Insert rows at `position` (clamped to the height), unmasked.
    pub fn insert_rows(&mut self, position: usize, rows: &Array2<f64>) -> Result<()> {
        let (r, c) = self.shape();
        if r == 0 && c == 0 {
            self.values = rows.clone();
            self.mask = Array2::from_elem(rows.raw_dim(), false);
            return Ok(());
        }
        if rows.ncols() != c {
            return Err(DataError::type_mismatch(
                format!("rows of {c} columns"),
                format!("{} columns", rows.ncols()),
            ));
        }
        let position = position.min(r);
        let added = rows.nrows();
        self.values = Array2::from_shape_fn((r + added, c), |(i, j)| {
            if i < position {
                self.values[(i, j)]
            } else if i < position + added {
                rows[(i - position, j)]
            } else {
                self.values[(i - added, j)]
            }
        });
        self.mask = Array2::from_shape_fn((r + added, c), |(i, j)| {
            if i < position {
                self.mask[(i, j)]
            } else if i < position + added {
                false
            } else {
                self.mask[(i - added, j)]
            }
        });
        Ok(())
    }

    /// Remove the given rows (indices may be unsorted; duplicates ignored).
    pub fn remove_rows(&mut self, indices: &[usize]) -> Result<()> {
        let r = self.n_rows();
        for &i in indices {
            if i >= r {
                return Err(DataError::index_out_of_range(i, r));
            }
        }
        let keep: Vec<usize> = (0..r).filter(|i| !indices.contains(i)).collect();
        self.values = self.values.select(Axis(0), &keep);
        self.mask = self.mask.select(Axis(0), &keep);
        Ok(())
    }

    /// Rebuild the matrix with columns in the given order.
    pub fn reorder_columns(&mut self, order: &[usize]) -> Result<()> {
        let c = self.n_cols();
        for &j in order {
            if j >= c {
                return Err(DataError::index_out_of_range(j, c));
            }
        }
        self.values = self.values.select(Axis(1), order);
        self.mask = self.mask.select(Axis(1), order);
        Ok(())
    }

    /// Swap two columns in place.
    pub fn swap_columns(&mut self, a: usize, b: usize) -> Result<()> {
        let c = self.n_cols();
        if a >= c {
            return Err(DataError::index_out_of_range(a, c));
        }
        if b >= c {
            return Err(DataError::index_out_of_range(b, c));
        }
        if a == b {
            return Ok(());
        }
        for i in 0..self.n_rows() {
            self.values.swap((i, a), (i, b));
            self.mask.swap((i, a), (i, b));
        }
        Ok(())
    }
}

impl PartialEq for DataMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.mask == other.mask
    }
}
