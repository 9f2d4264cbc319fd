// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File input/output.
//!
//! - [`FormatHandler`] / [`ParsedFile`] - the format seam
//! - [`FormatRegistry`] - ordered handler registry
//! - [`loader`] - auto-detecting load and save dispatch
//! - [`TdiFormat`] - the built-in tabular text format

pub mod handler;
pub mod loader;
pub mod registry;
pub mod tdi;

pub use handler::{FormatHandler, ParsedFile};
pub use loader::{LoadOptions, SaveOptions};
pub use registry::FormatRegistry;
pub use tdi::TdiFormat;
