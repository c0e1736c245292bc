//! # tracked-tables-store
//!
//! Persistence for tracked-table state.
//!
//! The tracker only needs a narrow key/value capability, [`StateStore`].
//! This crate provides that trait, an in-memory implementation, and a
//! [`PackageStore`] that keeps the state as a custom XML part inside a zip
//! package, the way an Office document embeds it.

pub mod error;
pub mod memory;
mod opc;
pub mod package;
pub mod part;
pub mod state;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use package::PackageStore;
pub use part::{StatePart, DEFAULT_NAMESPACE, ROOT_ELEMENT};
pub use state::{clear_registry, load_registry, save_registry, DEFAULT_STATE_KEY};
pub use store::StateStore;
