// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File-format handler seam.
//!
//! A format plugs in by implementing [`FormatHandler`]. The contract that
//! makes auto-detection work: `parse` must fail with [`DataError::Load`]
//! to mean "not my format, try the next handler". Any other error aborts
//! the whole load.

use std::path::Path;

use ndarray::Array2;

use crate::core::error::Result;
use crate::core::metadata::TypedMetadata;
use crate::data::file::DataFile;

/// The parts a handler extracts from a file on disk.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Numeric data, one row per record
    pub values: Array2<f64>,
    /// Mask flags, same shape as `values`
    pub mask: Array2<bool>,
    /// Metadata found in the file
    pub metadata: TypedMetadata,
    /// Column headers, in column order
    pub column_headers: Vec<String>,
}

impl ParsedFile {
    /// Wrap a value array with an all-clear mask and no metadata.
    pub fn new(values: Array2<f64>) -> Self {
        let mask = Array2::from_elem(values.raw_dim(), false);
        Self {
            values,
            mask,
            metadata: TypedMetadata::new(),
            column_headers: Vec::new(),
        }
    }
}

/// One on-disk file format.
pub trait FormatHandler: Send + Sync {
    /// Short unique name, e.g. `"TDI"`.
    fn name(&self) -> &str;

    /// Detection order. Lower priorities are tried first; more specific
    /// formats should use lower numbers than permissive fallbacks.
    fn priority(&self) -> u32 {
        32
    }

    /// Filename glob patterns this format typically uses, most canonical
    /// first (the first pattern's extension is used when saving).
    fn patterns(&self) -> &[&str];

    /// Mime types this format can occur under. An empty list means the
    /// handler is tried for any file.
    fn mime_types(&self) -> &[&str] {
        &[]
    }

    /// Read a file, failing with [`DataError::Load`] when the content is
    /// not this format.
    ///
    /// [`DataError::Load`]: crate::core::error::DataError::Load
    fn parse(&self, path: &Path) -> Result<ParsedFile>;

    /// Write a data file to disk in this format.
    fn write(&self, path: &Path, file: &DataFile) -> Result<()>;
}
