// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # labdata
//!
//! In-memory laboratory measurement data: tabular files and image
//! stacks.
//!
//! The central type is [`DataFile`], a 2-D numeric matrix carrying an
//! ordered, type-hinted metadata dictionary, per-column role annotations
//! ("setas") and a boolean cell mask. Files load through an extensible
//! [`FormatRegistry`] that tries format handlers in priority order until
//! one accepts the file; the tab-delimited TDI format is built in as the
//! fallback and the save default.
//!
//! [`ImageStack`] complements it for 3-D data: an ordered collection of
//! named 2-D images sharing one padded buffer, with per-page metadata.
//!
//! ## Example
//!
//! ```no_run
//! use labdata::DataFile;
//!
//! # fn main() -> labdata::Result<()> {
//! let mut data = DataFile::from_columns(vec![
//!     ("Temperature".to_string(), vec![1.2, 2.4, 3.1]),
//!     ("Resistance".to_string(), vec![100.0, 102.5, 108.2]),
//! ])?;
//! data.set_setas("xy")?;
//! data.metadata_mut().set("Sample", "NbSe2");
//! data.save(Some("run-001.txt".as_ref()))?;
//!
//! let reloaded = DataFile::load("run-001.txt")?;
//! assert_eq!(reloaded.shape(), (3, 2));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod image;
pub mod io;

pub use crate::core::{ColumnRoles, DataError, MetaValue, Result, Role, TypedMetadata};
pub use crate::data::{ColumnSelector, ColumnSpec, DataFile, DeleteColumns, DeleteRows, ValueTest};
pub use crate::image::{ImagePage, ImageStack, PageKey};
pub use crate::io::{FormatHandler, FormatRegistry, LoadOptions, ParsedFile, SaveOptions, TdiFormat};
