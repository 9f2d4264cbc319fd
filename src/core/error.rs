// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for labdata.
//!
//! Provides error types for data container operations:
//! - Format detection and parsing
//! - Metadata lookup and decoding
//! - Column and page addressing

use std::fmt;

/// Errors that can occur during data container operations.
#[derive(Debug, Clone)]
pub enum DataError {
    /// A format handler rejected a file during a parse attempt.
    ///
    /// This is the only recoverable error in the load path: the dispatch
    /// loop converts it into "try the next handler".
    Load {
        /// Handler that rejected the file
        handler: String,
        /// Why the handler rejected it
        reason: String,
    },

    /// No registered format handler could parse the file.
    UnrecognisedFormat {
        /// File that could not be loaded
        path: String,
        /// Handlers that were attempted, in order
        attempted: Vec<String>,
    },

    /// File does not exist (pre-flight check before any parse attempt).
    FileNotFound {
        /// Path that was requested
        path: String,
    },

    /// A column selector matched no column.
    ColumnNotFound {
        /// Textual form of the selector
        selector: String,
    },

    /// A metadata key or page name was not found.
    KeyNotFound {
        /// Key that was requested
        key: String,
    },

    /// An integer index was outside the container bounds.
    IndexOutOfRange {
        /// Index that was requested
        index: usize,
        /// Container length
        len: usize,
    },

    /// Malformed input to a mutation call.
    TypeMismatch {
        /// What the operation required
        expected: String,
        /// What it was given
        got: String,
    },

    /// Parse error in a metadata line or data cell.
    Parse {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Underlying I/O error.
    Io {
        /// Error message
        message: String,
    },
}

impl DataError {
    /// Create a load rejection error (signals "wrong format, try next").
    pub fn load(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::Load {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    /// Create an "unrecognised format" error naming all attempted handlers.
    pub fn unrecognised_format(path: impl Into<String>, attempted: Vec<String>) -> Self {
        DataError::UnrecognisedFormat {
            path: path.into(),
            attempted,
        }
    }

    /// Create a "file not found" error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        DataError::FileNotFound { path: path.into() }
    }

    /// Create a "column not found" error.
    pub fn column_not_found(selector: impl Into<String>) -> Self {
        DataError::ColumnNotFound {
            selector: selector.into(),
        }
    }

    /// Create a "key not found" error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        DataError::KeyNotFound { key: key.into() }
    }

    /// Create an "index out of range" error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        DataError::IndexOutOfRange { index, len }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        DataError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        DataError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// True if this error signals a recoverable format rejection.
    pub fn is_load_rejection(&self) -> bool {
        matches!(self, DataError::Load { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DataError::Load { handler, reason } => {
                vec![("handler", handler.clone()), ("reason", reason.clone())]
            }
            DataError::UnrecognisedFormat { path, attempted } => {
                vec![("path", path.clone()), ("attempted", attempted.join(", "))]
            }
            DataError::FileNotFound { path } => vec![("path", path.clone())],
            DataError::ColumnNotFound { selector } => vec![("selector", selector.clone())],
            DataError::KeyNotFound { key } => vec![("key", key.clone())],
            DataError::IndexOutOfRange { index, len } => {
                vec![("index", index.to_string()), ("len", len.to_string())]
            }
            DataError::TypeMismatch { expected, got } => {
                vec![("expected", expected.clone()), ("got", got.clone())]
            }
            DataError::Parse { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            DataError::Io { message } => vec![("message", message.clone())],
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Load { handler, reason } => {
                write!(f, "Handler '{handler}' rejected file: {reason}")
            }
            DataError::UnrecognisedFormat { path, attempted } => write!(
                f,
                "No handler recognised '{path}' (attempted: {})",
                attempted.join(", ")
            ),
            DataError::FileNotFound { path } => write!(f, "Cannot find {path} to load"),
            DataError::ColumnNotFound { selector } => {
                write!(f, "No column matched selector '{selector}'")
            }
            DataError::KeyNotFound { key } => write!(f, "Key not found: '{key}'"),
            DataError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} is out of range for length {len}")
            }
            DataError::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {expected}, got {got}")
            }
            DataError::Parse { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            DataError::Io { message } => write!(f, "IO error: {message}"),
        }
    }
}

impl std::error::Error for DataError {}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for labdata operations.
pub type Result<T> = std::result::Result<T, DataError>;
