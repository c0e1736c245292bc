//! Registry persistence over a [`StateStore`]

use tracked_tables_core::TrackedTableRegistry;

use crate::error::StoreResult;
use crate::store::StateStore;

/// Key the registry is stored under unless configured otherwise
pub const DEFAULT_STATE_KEY: &str = "TrackedTables";

/// Serialize `registry` to JSON and store it under `key`
pub fn save_registry<S: StateStore + ?Sized>(
    store: &mut S,
    key: &str,
    registry: &TrackedTableRegistry,
) -> StoreResult<()> {
    let json = registry.to_json()?;
    store.save(key, &json)
}

/// Load and deserialize the registry stored under `key`
///
/// The blob carries no schema version; a blob written by an incompatible
/// layout fails with a core JSON error.
pub fn load_registry<S: StateStore + ?Sized>(
    store: &S,
    key: &str,
) -> StoreResult<Option<TrackedTableRegistry>> {
    match store.load(key)? {
        Some(json) => Ok(Some(TrackedTableRegistry::from_json(&json)?)),
        None => Ok(None),
    }
}

/// Remove the registry stored under `key`
pub fn clear_registry<S: StateStore + ?Sized>(store: &mut S, key: &str) -> StoreResult<()> {
    store.clear(key)
}
