//! Key/value storage helpers
//!
//! These report outcomes as worksheet-facing status strings rather than
//! errors, since their result is shown in a cell.

use tracked_tables_store::StateStore;

/// Store `value` under `key`, returning a status message
pub fn store_value<S: StateStore + ?Sized>(store: &mut S, key: &str, value: &str) -> String {
    match store.save(key, value) {
        Ok(()) => format!("Success: Item with key '{key}' saved to storage."),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to store value");
            format!("Error: Unable to save item with key '{key}' to storage. {e}")
        }
    }
}

/// Read the value stored under `key`.
///
/// Missing keys and storage failures both yield `None`.
pub fn get_value<S: StateStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.load(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracked_tables_store::{MemoryStore, StoreError, StoreResult};

    struct ReadOnly;

    impl StateStore for ReadOnly {
        fn save(&mut self, _key: &str, _state: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("read-only".into()))
        }

        fn load(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("read-only".into()))
        }

        fn clear(&mut self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_store_and_get() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store_value(&mut store, "color", "blue"),
            "Success: Item with key 'color' saved to storage."
        );
        assert_eq!(get_value(&store, "color").as_deref(), Some("blue"));
        assert_eq!(get_value(&store, "size"), None);
    }

    #[test]
    fn test_store_failure_message() {
        let mut store = ReadOnly;
        assert_eq!(
            store_value(&mut store, "color", "blue"),
            "Error: Unable to save item with key 'color' to storage. Storage unavailable: read-only"
        );
        assert_eq!(get_value(&store, "color"), None);
    }
}
