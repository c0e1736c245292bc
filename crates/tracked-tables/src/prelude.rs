//! Prelude module - common imports for tracked-tables users
//!
//! ```rust
//! use tracked_tables::prelude::*;
//! ```

pub use crate::{
    // Events
    ChangeType,
    HeaderSnapshot,
    // Stores
    MemoryStore,
    PackageStore,
    // Reconciliation
    ReconcileReport,
    StateStore,
    TableChangeEvent,
    // Model
    TrackedColumn,
    TrackedTable,
    TrackedTableRegistry,
    // Session
    Tracker,
    TrackerError,
    TrackerOptions,
    TrackerResult,
};
