//! Tracker options

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracked_tables_store::{PackageStore, DEFAULT_NAMESPACE, DEFAULT_STATE_KEY};

use crate::error::{TrackerError, TrackerResult};

/// Options controlling where a [`Tracker`](crate::Tracker) persists state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerOptions {
    /// Key the registry is stored under (default: `TrackedTables`)
    pub state_key: String,
    /// Namespace of custom XML parts written to packages
    pub part_namespace: String,
    /// Persist the registry after every change that mutated a table
    pub persist_on_change: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            state_key: DEFAULT_STATE_KEY.to_string(),
            part_namespace: DEFAULT_NAMESPACE.to_string(),
            persist_on_change: true,
        }
    }
}

impl TrackerOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TrackerError::Options {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// A package store for `path` using these options' part namespace
    pub fn package_store<P: AsRef<Path>>(&self, path: P) -> PackageStore {
        PackageStore::new(path).with_namespace(self.part_namespace.clone())
    }
}
