// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Explicit handler registry.
//!
//! Handlers are registered by the caller and held sorted by ascending
//! priority. Registration order breaks ties, so two handlers at the same
//! priority are tried in the order they were registered.

use super::handler::FormatHandler;
use super::tdi::TdiFormat;

/// An ordered collection of format handlers.
pub struct FormatRegistry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    /// Create a registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler, keeping the list sorted by ascending priority.
    pub fn register(&mut self, handler: Box<dyn FormatHandler>) -> &mut Self {
        let at = self
            .handlers
            .partition_point(|h| h.priority() <= handler.priority());
        self.handlers.insert(at, handler);
        self
    }

    /// Look a handler up by its name.
    pub fn by_name(&self, name: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(Box::as_ref)
    }

    /// Iterate over handlers in detection order.
    pub fn handlers(&self) -> impl Iterator<Item = &dyn FormatHandler> {
        self.handlers.iter().map(Box::as_ref)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for FormatRegistry {
    /// The built-in registry: just the TDI fallback format.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TdiFormat));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{DataError, Result};
    use crate::data::file::DataFile;
    use crate::io::handler::ParsedFile;
    use std::path::Path;

    struct Fake {
        name: &'static str,
        priority: u32,
    }

    impl FormatHandler for Fake {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> u32 {
            self.priority
        }
        fn patterns(&self) -> &[&str] {
            &["*.fake"]
        }
        fn parse(&self, _path: &Path) -> Result<ParsedFile> {
            Err(DataError::load(self.name, "always rejects"))
        }
        fn write(&self, _path: &Path, _file: &DataFile) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sorted_by_priority_with_stable_ties() {
        let mut registry = FormatRegistry::empty();
        registry
            .register(Box::new(Fake { name: "b", priority: 16 }))
            .register(Box::new(Fake { name: "a", priority: 8 }))
            .register(Box::new(Fake { name: "c", priority: 16 }))
            .register(Box::new(Fake { name: "d", priority: 64 }));
        let names: Vec<&str> = registry.handlers().map(|h| h.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_by_name() {
        let registry = FormatRegistry::default();
        assert!(registry.by_name("TDI").is_some());
        assert!(registry.by_name("missing").is_none());
        assert_eq!(registry.len(), 1);
    }
}
