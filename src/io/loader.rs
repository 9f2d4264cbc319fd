// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format auto-detection and dispatch.
//!
//! Loading walks the registry in ascending priority and asks each
//! candidate handler to parse the file. A handler signals "wrong format"
//! with [`DataError::Load`]; the loop logs it and moves on. Any other
//! error aborts the load immediately. The first success wins and is
//! recorded in the `"Loaded as"` metadata key.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{DataError, Result};
use crate::data::file::DataFile;
use crate::data::matrix::DataMatrix;
use crate::io::registry::FormatRegistry;

/// How a load resolves its handler.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Restrict the load to one named handler
    pub filetype: Option<String>,
    /// Walk every registered handler in priority order
    pub auto_load: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            filetype: None,
            auto_load: true,
        }
    }
}

/// How a save resolves its handler.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Write with the handler recorded in the `"Loaded as"` metadata key
    pub as_loaded: bool,
    /// Write with an explicitly named handler
    pub handler: Option<String>,
}

/// Guess a mime type from the file extension. Unknown extensions return
/// `None`, which never skips a handler.
fn guess_mime(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") | Some("tdi") | Some("dat") => Some("text/plain"),
        _ => None,
    }
}

/// Load a data file, trying handlers until one accepts it.
pub fn load(path: &Path, registry: &FormatRegistry, options: &LoadOptions) -> Result<DataFile> {
    if !path.exists() {
        return Err(DataError::file_not_found(path.display().to_string()));
    }

    let candidates: Vec<&dyn crate::io::handler::FormatHandler> = match &options.filetype {
        Some(name) => {
            let handler = registry.by_name(name).ok_or_else(|| {
                DataError::unrecognised_format(path.display().to_string(), vec![name.clone()])
            })?;
            vec![handler]
        }
        None if options.auto_load => registry.handlers().collect(),
        // No filetype and no auto-load: only the first handler is tried
        None => registry.handlers().take(1).collect(),
    };

    // The mime short-circuit belongs to the auto-detection walk only; an
    // explicitly named filetype is always attempted.
    let mime = if options.filetype.is_none() && options.auto_load {
        guess_mime(path)
    } else {
        None
    };
    let mut attempted = Vec::new();
    for handler in candidates {
        if !handler.mime_types().is_empty() {
            if let Some(m) = mime {
                if !handler.mime_types().contains(&m) {
                    continue;
                }
            }
        }
        attempted.push(handler.name().to_string());
        match handler.parse(path) {
            Ok(parsed) => {
                let matrix = DataMatrix::with_mask(parsed.values, parsed.mask)?;
                let mut file =
                    DataFile::from_parts(matrix, parsed.metadata, parsed.column_headers);
                file.metadata_mut().set("Loaded as", handler.name());
                file.set_filename(path);
                return Ok(file);
            }
            Err(e) if e.is_load_rejection() => {
                debug!(handler = handler.name(), error = %e, "handler rejected file");
            }
            Err(e) => return Err(e),
        }
    }
    Err(DataError::unrecognised_format(
        path.display().to_string(),
        attempted,
    ))
}

/// Save a data file, normalising the extension to the handler's first
/// pattern.
pub fn save(
    file: &mut DataFile,
    path: Option<&Path>,
    registry: &FormatRegistry,
    options: &SaveOptions,
) -> Result<()> {
    let handler_name = if let Some(name) = &options.handler {
        name.clone()
    } else if options.as_loaded {
        file.metadata()
            .get("Loaded as")?
            .as_str()
            .unwrap_or("TDI")
            .to_string()
    } else {
        "TDI".to_string()
    };
    let handler = registry.by_name(&handler_name).ok_or_else(|| {
        DataError::unrecognised_format(handler_name.clone(), vec![handler_name.clone()])
    })?;

    let base: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => file
            .filename()
            .map(Path::to_path_buf)
            .ok_or_else(|| DataError::Io {
                message: "no filename given for save".to_string(),
            })?,
    };
    let target = normalise_extension(&base, handler.patterns());

    handler.write(&target, file)?;
    file.set_filename(target);
    Ok(())
}

/// Force the path's extension to the one in the handler's first pattern.
fn normalise_extension(path: &Path, patterns: &[&str]) -> PathBuf {
    let ext = patterns
        .first()
        .and_then(|p| p.rsplit('.').next())
        .filter(|e| !e.is_empty() && !e.contains('*'));
    match ext {
        Some(ext) => path.with_extension(ext),
        None => path.to_path_buf(),
    }
}

impl DataFile {
    /// Load a file with the built-in registry and default options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load(
            path.as_ref(),
            &FormatRegistry::default(),
            &LoadOptions::default(),
        )
    }

    /// Load a file through a caller-supplied registry.
    pub fn load_with(
        path: impl AsRef<Path>,
        registry: &FormatRegistry,
        options: &LoadOptions,
    ) -> Result<Self> {
        load(path.as_ref(), registry, options)
    }

    /// Save to disk in the default (TDI) format.
    ///
    /// With no path the file's recorded filename is reused.
    pub fn save(&mut self, path: Option<&Path>) -> Result<()> {
        save(
            self,
            path,
            &FormatRegistry::default(),
            &SaveOptions::default(),
        )
    }

    /// Save through a caller-supplied registry and options.
    pub fn save_with(
        &mut self,
        path: Option<&Path>,
        registry: &FormatRegistry,
        options: &SaveOptions,
    ) -> Result<()> {
        save(self, path, registry, options)
    }
}
