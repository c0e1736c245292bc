//! Registry of tracked tables keyed by table name

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::TrackedTable;

/// The set of tracked tables belonging to one document
///
/// Serializes as `{"tables": [...]}`, which is the blob persisted into the
/// document's custom XML part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedTableRegistry {
    #[serde(default)]
    tables: Vec<TrackedTable>,
}

impl TrackedTableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no tables are tracked
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Register a table. Fails if the name is taken or the definition is invalid.
    pub fn insert(&mut self, table: TrackedTable) -> Result<()> {
        table.validate()?;
        if self.contains(&table.name) {
            return Err(Error::DuplicateTable(table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Check if a table with this name is tracked
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get a table by name
    pub fn get(&self, name: &str) -> Option<&TrackedTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get a table by name, mutably
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TrackedTable> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Stop tracking a table, returning it
    pub fn remove(&mut self, name: &str) -> Option<TrackedTable> {
        let index = self.tables.iter().position(|t| t.name == name)?;
        Some(self.tables.remove(index))
    }

    /// Iterate over tables in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedTable> {
        self.tables.iter()
    }

    /// Table names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Remove every table
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Serialize to the persisted JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the persisted JSON form.
    ///
    /// Duplicate table names in the blob are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: TrackedTableRegistry = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for table in parsed.tables {
            if registry.contains(&table.name) {
                return Err(Error::DuplicateTable(table.name));
            }
            registry.tables.push(table);
        }
        Ok(registry)
    }
}

impl<'a> IntoIterator for &'a TrackedTableRegistry {
    type Item = &'a TrackedTable;
    type IntoIter = std::slice::Iter<'a, TrackedTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
