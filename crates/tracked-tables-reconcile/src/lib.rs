//! # tracked-tables-reconcile
//!
//! Keeps a [`TrackedTable`](tracked_tables_core::TrackedTable)'s column
//! configuration in step with the live header row.
//!
//! - [`classify`] - diff two header label sequences
//! - [`reconcile`] / [`apply_changes`] - mutate a table to match a new header
//! - [`handle_table_change`] - decide from a host change event whether to reconcile

pub mod classify;
pub mod event;
pub mod reconcile;

pub use classify::{classify, ColumnChanges, Rename};
pub use event::{
    handle_table_change, requires_reconcile, ChangeType, HeaderSnapshot, ParseChangeTypeError,
    TableChangeEvent,
};
pub use reconcile::{apply_changes, reconcile, LookupMiss, ReconcileReport};
