//! The persistence capability consumed by the tracker

use crate::error::StoreResult;

/// Key/value storage for serialized document state.
///
/// Implementations stand in for the host's document-level storage. Failures
/// are returned to the caller as-is; nothing here retries.
pub trait StateStore {
    /// Store `state` under `key`, replacing any previous value
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()>;

    /// Fetch the value stored under `key`
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Remove the value stored under `key`. Clearing a missing key is not an error.
    fn clear(&mut self, key: &str) -> StoreResult<()>;
}

impl<S: StateStore + ?Sized> StateStore for &mut S {
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()> {
        (**self).save(key, state)
    }

    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).load(key)
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        (**self).clear(key)
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()> {
        (**self).save(key, state)
    }

    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).load(key)
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        (**self).clear(key)
    }
}
