use std::collections::BTreeMap;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::table::TableEntry;

/// Table entries keyed by lowercase type name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    entries: BTreeMap<String, TableEntry>,
}

impl Registry {
    /// Insert an entry, replacing any earlier entry with the same lowercase
    /// name. Returns the replaced entry.
    pub fn insert(&mut self, entry: TableEntry) -> Option<TableEntry> {
        self.entries.insert(entry.registry_key(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&TableEntry> {
        self.entries.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending byte order of their type name. This is the
    /// emission order of every generated section.
    pub fn sorted(&self) -> Vec<&TableEntry> {
        let mut entries: Vec<&TableEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

/// State threaded through one generation run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerationContext {
    pub registry: Registry,
    pub diagnostics: Diagnostics,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// True once any error-level diagnostic has been recorded.
    pub fn is_fatal(&self) -> bool {
        self.diagnostics.has_errors()
    }
}
