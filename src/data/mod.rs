// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Tabular measurement data.
//!
//! - [`DataMatrix`] - masked numeric matrix with a mask stack
//! - [`ColumnSelector`] - column lookup by index, header, pattern or role
//! - [`DataFile`] - the full data table: matrix + metadata + roles

pub mod file;
pub mod matrix;
pub mod search;

pub use file::{ColumnSpec, DataFile, DeleteColumns, DeleteRows, ValueTest};
pub use matrix::{DataMatrix, RowView};
pub use search::ColumnSelector;
