//! In-memory store

use ahash::AHashMap;

use crate::error::StoreResult;
use crate::store::StateStore;

/// A [`StateStore`] kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()> {
        self.items.insert(key.to_string(), state.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        self.items.remove(key);
        Ok(())
    }
}
