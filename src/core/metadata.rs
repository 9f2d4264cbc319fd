// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Insertion-ordered, type-hinted metadata dictionary.
//!
//! Keys iterate in insertion order so that a file's metadata round-trips
//! through export/import unchanged. Consumers that need a stable order for
//! writing one metadata line per data row must sort explicitly via
//! [`sorted_keys`](TypedMetadata::sorted_keys).

use std::collections::HashMap;

use regex::Regex;

use super::error::{DataError, Result};
use super::value::MetaValue;

/// Ordered string-keyed store of [`MetaValue`] entries.
#[derive(Debug, Clone, Default)]
pub struct TypedMetadata {
    order: Vec<String>,
    entries: HashMap<String, MetaValue>,
}

impl TypedMetadata {
    /// Create an empty metadata store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a key, overwriting any previous entry.
    ///
    /// Overwriting keeps the key's original position in the iteration
    /// order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, value.into());
    }

    /// Look up a value, failing with `KeyNotFound` if absent.
    pub fn get(&self, key: &str) -> Result<&MetaValue> {
        self.entries
            .get(key)
            .ok_or_else(|| DataError::key_not_found(key))
    }

    /// Remove an entry, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Keys sorted lexicographically (for stable file export).
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.order.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Keys matching a regular expression.
    pub fn keys_matching(&self, pattern: &Regex) -> Vec<&str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|k| pattern.is_match(k))
            .collect()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.order
            .iter()
            .map(move |k| (k.as_str(), &self.entries[k]))
    }

    /// Parse and store a serialised `key{type}=value` line.
    ///
    /// The `{type}` segment is optional and defaults to kind detection.
    /// Fails with `ParseError` on lines without `=` or with an empty key.
    pub fn import_line(&mut self, line: &str) -> Result<()> {
        let (lhs, raw) = line
            .split_once('=')
            .ok_or_else(|| DataError::parse("metadata line", format!("no '=' in '{line}'")))?;
        let lhs = lhs.trim();
        let (key, hint) = match lhs.find('{') {
            Some(open) if lhs.ends_with('}') => {
                let key = lhs[..open].trim();
                let hint = &lhs[open + 1..lhs.len() - 1];
                (key, hint)
            }
            _ => (lhs, "Detect"),
        };
        if key.is_empty() {
            return Err(DataError::parse("metadata line", "empty key"));
        }
        let value = MetaValue::from_hinted(hint, raw)?;
        self.set(key, value);
        Ok(())
    }

    /// Export one entry as a type-tagged `key{type}=value` line.
    pub fn export_line(&self, key: &str) -> Result<String> {
        let value = self.get(key)?;
        Ok(format!("{key}{{{}}}={}", value.type_hint(), value.encode()))
    }

    /// Export every entry, one line each, in insertion order.
    pub fn export_all(&self) -> Vec<String> {
        self.order
            .iter()
            .map(|k| {
                let value = &self.entries[k];
                format!("{k}{{{}}}={}", value.type_hint(), value.encode())
            })
            .collect()
    }
}

impl PartialEq for TypedMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.entries == other.entries
    }
}

impl<'a> IntoIterator for &'a TypedMetadata {
    type Item = (&'a str, &'a MetaValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a MetaValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut md = TypedMetadata::new();
        md.set("Temperature", 4.2);
        md.set("Sample", "NbSe2");
        assert_eq!(md.len(), 2);
        assert_eq!(md.get("Temperature").unwrap().as_f64(), Some(4.2));
        assert_eq!(md.get("Sample").unwrap().as_str(), Some("NbSe2"));
        assert!(md.get("Field").is_err());

        assert_eq!(md.remove("Sample"), Some(MetaValue::Str("NbSe2".into())));
        assert_eq!(md.remove("Sample"), None);
        assert_eq!(md.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut md = TypedMetadata::new();
        md.set("a", 1i64);
        md.set("b", 2i64);
        md.set("a", 3i64);
        let keys: Vec<&str> = md.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(md.get("a").unwrap().as_i64(), Some(3));
    }

    #[test]
    fn test_insertion_order_iteration() {
        let mut md = TypedMetadata::new();
        md.set("zeta", 1i64);
        md.set("alpha", 2i64);
        md.set("mid", 3i64);
        let keys: Vec<&str> = md.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(md.sorted_keys(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_import_line_with_hint() {
        let mut md = TypedMetadata::new();
        md.import_line("Field{Double Float}=0.35").unwrap();
        assert_eq!(md.get("Field").unwrap(), &MetaValue::Float(0.35));

        md.import_line("Counts{I32}=1024").unwrap();
        assert_eq!(md.get("Counts").unwrap(), &MetaValue::Int(1024));

        md.import_line("Enabled{Boolean}=True").unwrap();
        assert_eq!(md.get("Enabled").unwrap(), &MetaValue::Bool(true));

        md.import_line("Profile{1D Array (Double Float)}=[1, 2, 3]")
            .unwrap();
        assert_eq!(
            md.get("Profile").unwrap(),
            &MetaValue::Array(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_import_line_detects_untagged() {
        let mut md = TypedMetadata::new();
        md.import_line("Temperature=4.2").unwrap();
        assert_eq!(md.get("Temperature").unwrap(), &MetaValue::Float(4.2));
        md.import_line("Sample=NbSe2").unwrap();
        assert_eq!(md.get("Sample").unwrap(), &MetaValue::Str("NbSe2".into()));
    }

    #[test]
    fn test_import_line_unknown_hint() {
        let mut md = TypedMetadata::new();
        md.import_line("Weird{Cluster}=1;2;3").unwrap();
        assert_eq!(md.get("Weird").unwrap(), &MetaValue::Str("1;2;3".into()));
    }

    #[test]
    fn test_import_line_malformed() {
        let mut md = TypedMetadata::new();
        assert!(md.import_line("no equals sign").is_err());
        assert!(md.import_line("=value only").is_err());
        assert!(md.is_empty());
    }

    #[test]
    fn test_export_line_round_trip() {
        let mut md = TypedMetadata::new();
        md.set("Temperature", 4.2);
        let line = md.export_line("Temperature").unwrap();
        assert_eq!(line, "Temperature{Double Float}=4.2");

        let mut other = TypedMetadata::new();
        other.import_line(&line).unwrap();
        assert_eq!(other.get("Temperature").unwrap(), &MetaValue::Float(4.2));
    }

    #[test]
    fn test_export_all_order() {
        let mut md = TypedMetadata::new();
        md.set("b", 1i64);
        md.set("a", "x");
        let lines = md.export_all();
        assert_eq!(lines, vec!["b{I32}=1", "a{String}=x"]);
    }

    #[test]
    fn test_export_missing_key() {
        let md = TypedMetadata::new();
        assert!(md.export_line("nothing").is_err());
    }

    #[test]
    fn test_keys_matching() {
        let mut md = TypedMetadata::new();
        md.set("Oxford:Temperature", 4.2);
        md.set("Oxford:Field", 1.0);
        md.set("Sample", "X");
        let re = Regex::new("^Oxford:").unwrap();
        assert_eq!(
            md.keys_matching(&re),
            vec!["Oxford:Temperature", "Oxford:Field"]
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut md = TypedMetadata::new();
        md.set("a", 1i64);
        let mut copy = md.clone();
        copy.set("a", 2i64);
        copy.set("b", 3i64);
        assert_eq!(md.get("a").unwrap().as_i64(), Some(1));
        assert!(!md.contains("b"));
    }
}
