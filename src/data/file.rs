// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The central measurement-file type.
//!
//! A [`DataFile`] owns exactly one [`DataMatrix`], one [`TypedMetadata`]
//! dictionary, one [`ColumnRoles`] map and the column headers, and keeps
//! all four in lock-step through every structural edit. Mutating methods
//! are fluent (they return `&mut Self`) and atomic per call: a failed call
//! leaves the file unchanged.

use std::fmt;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::core::error::{DataError, Result};
use crate::core::metadata::TypedMetadata;
use crate::core::setas::{ColumnRoles, Role};
use crate::data::matrix::{DataMatrix, RowView};
use crate::data::search::ColumnSelector;

/// A 2-D numeric data table with typed metadata and column roles.
#[derive(Debug, Clone, Default)]
pub struct DataFile {
    matrix: DataMatrix,
    metadata: TypedMetadata,
    roles: ColumnRoles,
    column_headers: Vec<String>,
    filename: Option<PathBuf>,
}

/// Placement and labelling of a column being added.
#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    /// Header text; `Column <index>` when absent
    pub header: Option<String>,
    /// Insertion index; append when absent
    pub index: Option<usize>,
    /// Overwrite the column at `index` instead of inserting
    pub replace: bool,
    /// Role for the new column; existing role is kept on replace
    pub role: Option<Role>,
}

/// Which columns a [`DataFile::del_column`] call removes.
pub enum DeleteColumns {
    /// Columns containing masked elements
    Masked,
    /// Columns with no assigned role
    UnsetRoles,
    /// Keep where true, delete where false (one flag per column)
    Flags(Vec<bool>),
    /// Later columns repeating an earlier header
    Duplicates,
    /// Every column the selector resolves to
    Selector(ColumnSelector),
}

/// Which rows a [`DataFile::del_rows`] call removes.
pub enum DeleteRows {
    /// Rows containing masked elements
    Masked,
    /// A half-open index range
    Range(std::ops::Range<usize>),
    /// Explicit row indices
    Indices(Vec<usize>),
    /// Keep where true, delete where false (one flag per row)
    Flags(Vec<bool>),
    /// Rows for which the predicate is true
    Predicate(Box<dyn Fn(&RowView<'_>) -> bool>),
    /// Rows whose value in one column passes a test
    Column {
        selector: ColumnSelector,
        test: ValueTest,
    },
}

/// A test applied to a single cell value, with its row for context.
pub enum ValueTest {
    /// Exact equality
    Equals(f64),
    /// Inclusive range
    Between(f64, f64),
    /// Arbitrary predicate over the cell value and its row
    Predicate(Box<dyn Fn(f64, &RowView<'_>) -> bool>),
}

impl ValueTest {
    fn passes(&self, value: f64, row: &RowView<'_>) -> bool {
        match self {
            ValueTest::Equals(target) => value == *target,
            ValueTest::Between(lo, hi) => *lo <= value && value <= *hi,
            ValueTest::Predicate(f) => f(value, row),
        }
    }
}

impl DataFile {
    /// Create an empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing array, auto-naming columns `Column 0..`.
    pub fn from_array(values: Array2<f64>) -> Self {
        let cols = values.ncols();
        Self {
            matrix: DataMatrix::from_array(values),
            metadata: TypedMetadata::new(),
            roles: ColumnRoles::unset(cols),
            column_headers: (0..cols).map(|j| format!("Column {j}")).collect(),
            filename: None,
        }
    }

    /// Build from ordered `(header, column values)` pairs.
    ///
    /// All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, v) in &columns {
            if v.len() != rows {
                return Err(DataError::type_mismatch(
                    format!("columns of {rows} values"),
                    format!("{} values in '{name}'", v.len()),
                ));
            }
        }
        let ncols = columns.len();
        let values = Array2::from_shape_fn((rows, ncols), |(i, j)| columns[j].1[i]);
        Ok(Self {
            matrix: DataMatrix::from_array(values),
            metadata: TypedMetadata::new(),
            roles: ColumnRoles::unset(ncols),
            column_headers: columns.into_iter().map(|(name, _)| name).collect(),
            filename: None,
        })
    }

    /// Start a file from metadata alone, with no data columns yet.
    pub fn from_metadata(metadata: TypedMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Stack 1-D arrays side by side as columns.
    pub fn column_stack(columns: &[Vec<f64>]) -> Result<Self> {
        Self::from_columns(
            columns
                .iter()
                .enumerate()
                .map(|(j, v)| (format!("Column {j}"), v.clone()))
                .collect(),
        )
    }

    /// Assemble a file from parsed parts, used by format handlers.
    pub(crate) fn from_parts(
        matrix: DataMatrix,
        metadata: TypedMetadata,
        column_headers: Vec<String>,
    ) -> Self {
        let cols = matrix.n_cols();
        let mut column_headers = column_headers;
        while column_headers.len() < cols {
            column_headers.push(format!("Column {}", column_headers.len()));
        }
        column_headers.truncate(cols);
        Self {
            matrix,
            metadata,
            roles: ColumnRoles::unset(cols),
            column_headers,
            filename: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Matrix shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// The underlying masked matrix.
    pub fn matrix(&self) -> &DataMatrix {
        &self.matrix
    }

    /// Mutable access to the masked matrix (shape edits go through
    /// [`DataFile`] methods so headers and roles stay in lock-step).
    pub fn matrix_mut(&mut self) -> &mut DataMatrix {
        &mut self.matrix
    }

    /// The metadata dictionary.
    pub fn metadata(&self) -> &TypedMetadata {
        &self.metadata
    }

    /// Mutable access to the metadata dictionary.
    pub fn metadata_mut(&mut self) -> &mut TypedMetadata {
        &mut self.metadata
    }

    /// The column role map.
    pub fn setas(&self) -> &ColumnRoles {
        &self.roles
    }

    /// Assign column roles from a role string such as `"xye"`.
    pub fn set_setas(&mut self, spec: &str) -> Result<&mut Self> {
        self.roles.assign(spec)?;
        Ok(self)
    }

    /// The column headers, in column order.
    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    /// The file path this data was loaded from or saved to.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Record the backing file path.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Resolve a selector to a single column index.
    pub fn find_column(&self, selector: &ColumnSelector) -> Result<usize> {
        selector.find_column(&self.column_headers, &self.roles)
    }

    /// Resolve a selector to every matching column index.
    pub fn find_columns(&self, selector: &ColumnSelector) -> Result<Vec<usize>> {
        selector.find_columns(&self.column_headers, &self.roles)
    }

    /// Values of one column.
    pub fn column(&self, selector: impl Into<ColumnSelector>) -> Result<Vec<f64>> {
        let ix = self.find_column(&selector.into())?;
        self.matrix.column(ix)
    }

    /// Iterate over tagged row views.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.matrix.rows(&self.roles)
    }

    /// Values of the x column.
    pub fn x(&self) -> Result<Vec<f64>> {
        let ix = self
            .roles
            .xcol()
            .ok_or_else(|| DataError::column_not_found("role 'x'"))?;
        self.matrix.column(ix)
    }

    /// Values of every y column, one vector per column.
    pub fn y(&self) -> Vec<Vec<f64>> {
        self.role_columns(Role::Y)
    }

    /// Values of every z column, one vector per column.
    pub fn z(&self) -> Vec<Vec<f64>> {
        self.role_columns(Role::Z)
    }

    /// Values of every y-error column.
    pub fn yerr(&self) -> Vec<Vec<f64>> {
        self.role_columns(Role::E)
    }

    fn role_columns(&self, role: Role) -> Vec<Vec<f64>> {
        self.roles
            .get(role)
            .indices()
            .into_iter()
            .filter_map(|ix| self.matrix.column(ix).ok())
            .collect()
    }

    // ------------------------------------------------------------------
    // Masking
    // ------------------------------------------------------------------

    /// Save the current mask and install a new one (clear when `None`).
    pub fn push_mask(&mut self, new: Option<Array2<bool>>) -> Result<&mut Self> {
        self.matrix.push_mask(new)?;
        Ok(self)
    }

    /// Restore the most recently pushed mask.
    pub fn pop_mask(&mut self) -> &mut Self {
        self.matrix.pop_mask();
        self
    }

    /// Mask every row failing `predicate`.
    pub fn filter<F>(&mut self, reset: bool, predicate: F) -> &mut Self
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        self.matrix.filter_rows(&self.roles, reset, predicate);
        self
    }

    /// Recompute the row mask from a per-row test.
    pub fn set_mask_by<F>(&mut self, invert: bool, cumulative: bool, func: F) -> &mut Self
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        self.matrix.set_mask_by(&self.roles, invert, cumulative, func);
        self
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Add (or replace) a column of values.
    ///
    /// A vector longer than the current row count grows the matrix with
    /// zero-filled rows; a shorter vector is zero-padded. All validation
    /// happens before any mutation.
    pub fn add_column(&mut self, values: Vec<f64>, spec: ColumnSpec) -> Result<&mut Self> {
        let (rows, cols) = self.matrix.shape();
        let index = spec.index.unwrap_or(cols).min(cols);
        if spec.replace && index >= cols {
            return Err(DataError::index_out_of_range(index, cols));
        }
        if let Some(role) = spec.role {
            if role.is_singleton() && self.roles.xcol().is_some_and(|ix| !(spec.replace && ix == index)) {
                return Err(DataError::type_mismatch(
                    "at most one x column",
                    "a second x assignment",
                ));
            }
        }

        let mut values = values;
        if values.len() > rows && cols > 0 {
            self.matrix.grow_rows(values.len());
        }
        let target_rows = self.matrix.n_rows().max(values.len());
        values.resize(target_rows, 0.0);

        if spec.replace {
            self.matrix.replace_column(index, &values)?;
            if let Some(header) = spec.header {
                self.column_headers[index] = header;
            }
            if let Some(role) = spec.role {
                self.roles.set_role(role, &[index])?;
            }
        } else {
            self.matrix.insert_column(index, &values)?;
            self.column_headers
                .insert(index, spec.header.unwrap_or_else(|| format!("Column {index}")));
            self.roles.insert(index, spec.role.unwrap_or(Role::Unset));
        }
        Ok(self)
    }

    /// Add a column computed from each existing row.
    pub fn add_column_with<F>(&mut self, func: F, spec: ColumnSpec) -> Result<&mut Self>
    where
        F: Fn(&RowView<'_>) -> f64,
    {
        let values: Vec<f64> = self.matrix.rows(&self.roles).map(|row| func(&row)).collect();
        self.add_column(values, spec)
    }

    /// Delete columns.
    pub fn del_column(&mut self, which: DeleteColumns) -> Result<&mut Self> {
        let cols = self.matrix.n_cols();
        let mut doomed: Vec<usize> = match which {
            DeleteColumns::Masked => {
                let removed = self.matrix.delete_masked_columns();
                for &ix in removed.iter().rev() {
                    self.column_headers.remove(ix);
                    self.roles.remove(ix)?;
                }
                return Ok(self);
            }
            DeleteColumns::UnsetRoles => (0..cols)
                .filter(|&j| !self.roles.role_of(j).map(Role::is_assigned).unwrap_or(false))
                .collect(),
            DeleteColumns::Flags(flags) => {
                if flags.len() != cols {
                    return Err(DataError::type_mismatch(
                        format!("{cols} column flags"),
                        format!("{} flags", flags.len()),
                    ));
                }
                flags
                    .iter()
                    .enumerate()
                    .filter(|(_, keep)| !**keep)
                    .map(|(j, _)| j)
                    .collect()
            }
            DeleteColumns::Duplicates => {
                let mut seen: Vec<&String> = Vec::new();
                let mut dupes = Vec::new();
                for (j, h) in self.column_headers.iter().enumerate() {
                    if seen.contains(&h) {
                        dupes.push(j);
                    } else {
                        seen.push(h);
                    }
                }
                dupes
            }
            DeleteColumns::Selector(selector) => self.find_columns(&selector)?,
        };
        doomed.sort_unstable();
        doomed.dedup();
        for &ix in doomed.iter().rev() {
            self.matrix.remove_column(ix)?;
            self.column_headers.remove(ix);
            self.roles.remove(ix)?;
        }
        Ok(self)
    }

    /// Delete rows. `invert` deletes the complement of the selection.
    pub fn del_rows(&mut self, which: DeleteRows, invert: bool) -> Result<&mut Self> {
        let rows = self.matrix.n_rows();
        let selected: Vec<usize> = match which {
            DeleteRows::Masked => self
                .matrix
                .rows(&self.roles)
                .filter(|row| row.any_masked())
                .map(|row| row.index)
                .collect(),
            DeleteRows::Range(range) => range.filter(|&i| i < rows).collect(),
            DeleteRows::Indices(indices) => {
                for &i in &indices {
                    if i >= rows {
                        return Err(DataError::index_out_of_range(i, rows));
                    }
                }
                indices
            }
            DeleteRows::Flags(flags) => {
                if flags.len() != rows {
                    return Err(DataError::type_mismatch(
                        format!("{rows} row flags"),
                        format!("{} flags", flags.len()),
                    ));
                }
                flags
                    .iter()
                    .enumerate()
                    .filter(|(_, keep)| !**keep)
                    .map(|(i, _)| i)
                    .collect()
            }
            DeleteRows::Predicate(func) => self
                .matrix
                .rows(&self.roles)
                .filter(|row| func(row))
                .map(|row| row.index)
                .collect(),
            DeleteRows::Column { selector, test } => {
                let ix = self.find_column(&selector)?;
                self.matrix
                    .rows(&self.roles)
                    .filter(|row| row.get(ix).map(|v| test.passes(v, row)).unwrap_or(false))
                    .map(|row| row.index)
                    .collect()
            }
        };
        let doomed: Vec<usize> = if invert {
            (0..rows).filter(|i| !selected.contains(i)).collect()
        } else {
            selected
        };
        self.matrix.remove_rows(&doomed)?;
        Ok(self)
    }

    /// Drop rows holding NaN in the given columns.
    ///
    /// With no selector the role-assigned columns are checked, or every
    /// column when no roles are assigned. Callers wanting a pruned copy
    /// clone first.
    pub fn del_nan(&mut self, cols: Option<ColumnSelector>) -> Result<&mut Self> {
        let check: Vec<usize> = match cols {
            Some(selector) => self.find_columns(&selector)?,
            None => {
                let assigned: Vec<usize> = (0..self.matrix.n_cols())
                    .filter(|&j| self.roles.role_of(j).map(Role::is_assigned).unwrap_or(false))
                    .collect();
                if assigned.is_empty() {
                    (0..self.matrix.n_cols()).collect()
                } else {
                    assigned
                }
            }
        };
        let doomed: Vec<usize> = self
            .matrix
            .rows(&self.roles)
            .filter(|row| check.iter().any(|&j| row.get(j).is_some_and(f64::is_nan)))
            .map(|row| row.index)
            .collect();
        self.matrix.remove_rows(&doomed)?;
        Ok(self)
    }

    /// Insert unmasked rows at a position (clamped to the height).
    pub fn insert_rows(&mut self, position: usize, rows: &Array2<f64>) -> Result<&mut Self> {
        if self.matrix.shape() == (0, 0) && self.column_headers.is_empty() {
            self.matrix.insert_rows(position, rows)?;
            let cols = self.matrix.n_cols();
            self.column_headers = (0..cols).map(|j| format!("Column {j}")).collect();
            self.roles = ColumnRoles::unset(cols);
            return Ok(self);
        }
        self.matrix.insert_rows(position, rows)?;
        Ok(self)
    }

    /// Rebuild the file with columns in the given order.
    pub fn reorder_columns(&mut self, order: &[usize]) -> Result<&mut Self> {
        self.roles.reorder(order)?;
        self.matrix.reorder_columns(order)?;
        self.column_headers = order
            .iter()
            .map(|&j| self.column_headers[j].clone())
            .collect();
        Ok(self)
    }

    /// Rename a column.
    pub fn rename_column(
        &mut self,
        selector: impl Into<ColumnSelector>,
        new_header: impl Into<String>,
    ) -> Result<&mut Self> {
        let ix = self.find_column(&selector.into())?;
        self.column_headers[ix] = new_header.into();
        Ok(self)
    }

    /// Swap pairs of columns, headers and roles included.
    ///
    /// Every selector is resolved before the first swap, so a pair that
    /// fails to resolve leaves the file untouched.
    pub fn swap_columns(
        &mut self,
        pairs: &[(ColumnSelector, ColumnSelector)],
    ) -> Result<&mut Self> {
        let mut resolved = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            resolved.push((self.find_column(a)?, self.find_column(b)?));
        }
        for (ia, ib) in resolved {
            self.matrix.swap_columns(ia, ib)?;
            self.column_headers.swap(ia, ib);
            self.roles.swap(ia, ib)?;
        }
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Textual representation
    // ------------------------------------------------------------------

    /// Render the tab-delimited textual form.
    ///
    /// `mask_marker` substitutes masked cells (display uses `#####`, the
    /// file writer writes the underlying values).
    pub(crate) fn tdi_lines(&self, mask_marker: Option<&str>) -> Vec<String> {
        let mut first = String::from("TDI Format 1.5");
        for h in &self.column_headers {
            first.push('\t');
            first.push_str(h);
        }
        let mut lines = vec![first];

        let keys = self.metadata.sorted_keys();
        let (rows, _) = self.matrix.shape();
        let total = keys.len().max(rows);
        for i in 0..total {
            let mut line = String::new();
            if let Some(key) = keys.get(i) {
                line.push_str(&self.metadata.export_line(key).unwrap_or_default());
            }
            if i < rows {
                for j in 0..self.matrix.n_cols() {
                    line.push('\t');
                    let masked = self.matrix.mask()[(i, j)];
                    match mask_marker {
                        Some(marker) if masked => line.push_str(marker),
                        _ => line.push_str(&self.matrix.values()[(i, j)].to_string()),
                    }
                }
            }
            lines.push(line);
        }
        lines
    }

    /// One-line summary: path, shape, role string and metadata count.
    pub fn fmt_short(&self) -> String {
        let name = self
            .filename
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unsaved>".to_string());
        let (rows, cols) = self.shape();
        format!(
            "{name}({rows}, {cols}) setas '{}' with {} metadata items",
            self.roles,
            self.metadata.len()
        )
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.tdi_lines(Some("#####")).iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}
