// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Typed metadata value system.
//!
//! Provides the tagged-union value type stored in a [`TypedMetadata`]
//! dictionary, together with the inline type-hint codec used by the TDI
//! file format. The tag travels with the value and is only ever inferred
//! at deserialisation time.
//!
//! [`TypedMetadata`]: crate::core::metadata::TypedMetadata

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{DataError, Result};

/// A metadata value with an explicit runtime kind.
///
/// Values round-trip through the textual `key{type}=value` form: the type
/// hint produced by [`type_hint`](MetaValue::type_hint) always decodes back
/// to a value of the same kind via [`from_hinted`](MetaValue::from_hinted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    /// UTF-8 string
    Str(String),
    /// Signed integer
    Int(i64),
    /// Double-precision float
    Float(f64),
    /// Boolean
    Bool(bool),
    /// 1-D numeric array
    Array(Vec<f64>),
}

impl MetaValue {
    /// The serialisation type hint for this value's kind.
    pub fn type_hint(&self) -> &'static str {
        match self {
            MetaValue::Str(_) => "String",
            MetaValue::Int(_) => "I32",
            MetaValue::Float(_) => "Double Float",
            MetaValue::Bool(_) => "Boolean",
            MetaValue::Array(_) => "1D Array (Double Float)",
        }
    }

    /// Encode the value into its textual serialised form.
    pub fn encode(&self) -> String {
        match self {
            MetaValue::Str(s) => s.clone(),
            MetaValue::Int(v) => v.to_string(),
            MetaValue::Float(v) => v.to_string(),
            MetaValue::Bool(v) => if *v { "True" } else { "False" }.to_string(),
            MetaValue::Array(arr) => {
                let parts: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }

    /// Decode a serialised value according to an explicit type hint.
    ///
    /// Unknown hints fall back to `Str`. The hint `"Detect"` (used when a
    /// metadata line carries no `{type}` segment) defers to [`detect`].
    ///
    /// [`detect`]: MetaValue::detect
    pub fn from_hinted(hint: &str, raw: &str) -> Result<Self> {
        match hint {
            "String" => Ok(MetaValue::Str(raw.to_string())),
            "I32" => raw
                .trim()
                .parse::<i64>()
                .map(MetaValue::Int)
                .map_err(|e| DataError::parse("I32 metadata value", e.to_string())),
            "Double Float" => raw
                .trim()
                .parse::<f64>()
                .map(MetaValue::Float)
                .map_err(|e| DataError::parse("Double Float metadata value", e.to_string())),
            "Boolean" => match raw.trim() {
                "True" | "true" | "1" => Ok(MetaValue::Bool(true)),
                "False" | "false" | "0" => Ok(MetaValue::Bool(false)),
                other => Err(DataError::parse(
                    "Boolean metadata value",
                    format!("'{other}' is not a boolean"),
                )),
            },
            "1D Array (Double Float)" => Self::parse_array(raw),
            "Detect" => Ok(Self::detect(raw)),
            _ => Ok(MetaValue::Str(raw.to_string())),
        }
    }

    /// Infer the kind of an untagged serialised value.
    ///
    /// Tries boolean, then integer, then float, then a bracketed numeric
    /// array, and falls back to string.
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "True" => return MetaValue::Bool(true),
            "False" => return MetaValue::Bool(false),
            _ => {}
        }
        if let Ok(v) = trimmed.parse::<i64>() {
            return MetaValue::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return MetaValue::Float(v);
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Ok(arr) = Self::parse_array(trimmed) {
                return arr;
            }
        }
        MetaValue::Str(raw.to_string())
    }

    fn parse_array(raw: &str) -> Result<Self> {
        let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
        if inner.trim().is_empty() {
            return Ok(MetaValue::Array(Vec::new()));
        }
        let mut values = Vec::new();
        for part in inner.split(',') {
            let v = part.trim().parse::<f64>().map_err(|e| {
                DataError::parse("array metadata value", format!("'{}': {e}", part.trim()))
            })?;
            values.push(v);
        }
        Ok(MetaValue::Array(values))
    }

    /// Check if this value is numeric (integer or float).
    pub fn is_numeric(&self) -> bool {
        matches!(self, MetaValue::Int(_) | MetaValue::Float(_))
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert this value to f64 (numeric kinds only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(v) => Some(*v as f64),
            MetaValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner numeric array.
    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            MetaValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

// Display matches the serialised form so exported lines read naturally.
impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Str(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Str(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<Vec<f64>> for MetaValue {
    fn from(v: Vec<f64>) -> Self {
        MetaValue::Array(v)
    }
}
