// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The tagged-data-interchange (TDI) tabular text format.
//!
//! Layout: tab is the sole delimiter. The first field of the first line
//! must read `TDI Format 1.5` (or the older `TDI Format=Text 1.0`); the
//! remaining first-line fields are column headers. Every following line
//! carries one `key{type}=value` metadata line in field 0 and optional
//! numeric data in fields 1 and up. Metadata may outrun the data rows and
//! vice versa.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use tracing::warn;

use crate::core::error::{DataError, Result};
use crate::core::metadata::TypedMetadata;
use crate::core::value::MetaValue;
use crate::data::file::DataFile;
use crate::io::handler::{FormatHandler, ParsedFile};

/// The built-in fallback format.
pub struct TdiFormat;

impl TdiFormat {
    const SIGNATURE_15: &'static str = "TDI Format 1.5";
    const SIGNATURE_10: &'static str = "TDI Format=Text 1.0";
}

impl FormatHandler for TdiFormat {
    fn name(&self) -> &str {
        "TDI"
    }

    fn patterns(&self) -> &[&str] {
        &["*.txt", "*.tdi", "*.dat"]
    }

    fn mime_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn parse(&self, path: &Path) -> Result<ParsedFile> {
        let content = fs::read_to_string(path)
            .map_err(|e| DataError::load("TDI", format!("cannot read as text: {e}")))?;
        let mut lines = content.lines();
        let first = lines
            .next()
            .ok_or_else(|| DataError::load("TDI", "empty file"))?;
        let mut fields = first.split('\t');
        let version = match fields.next().unwrap_or("") {
            Self::SIGNATURE_15 => 1.5,
            Self::SIGNATURE_10 => 1.0,
            other => {
                return Err(DataError::load(
                    "TDI",
                    format!("first field is '{other}', not a TDI signature"),
                ))
            }
        };
        let column_headers: Vec<String> = fields.map(str::to_string).collect();

        let mut metadata = TypedMetadata::new();
        metadata.set("TDI Format", MetaValue::Float(version));
        // Each cell is Some(value) or None for a masked NaN
        let mut rows: Vec<Vec<Option<f64>>> = Vec::new();
        for line in lines {
            let mut fields = line.split('\t');
            let meta_field = fields.next().unwrap_or("");
            if !meta_field.is_empty() {
                if let Err(e) = metadata.import_line(meta_field) {
                    warn!(line = meta_field, error = %e, "skipping bad metadata line");
                }
            }
            let cells: Vec<Option<f64>> = fields.map(|c| c.trim().parse::<f64>().ok()).collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(if rows.is_empty() { 0 } else { column_headers.len() });
        let mut values = Array2::from_elem((rows.len(), width), f64::NAN);
        let mut mask = Array2::from_elem((rows.len(), width), true);
        for (i, row) in rows.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if let Some(v) = cell {
                    values[(i, j)] = *v;
                    mask[(i, j)] = false;
                }
            }
        }

        Ok(ParsedFile {
            values,
            mask,
            metadata,
            column_headers,
        })
    }

    fn write(&self, path: &Path, file: &DataFile) -> Result<()> {
        let mut text = file.tdi_lines(None).join("\n");
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }
}
