//! # tracked-tables
//!
//! Keep spreadsheet tables that are bound to an external data source in step
//! with their header rows.
//!
//! A tracked table records, for each header column, whether it is bound to a
//! source field. When users rename, insert, delete or reorder header cells,
//! the [`Tracker`] classifies the difference against the last known header,
//! updates the table's column configuration and persists the result in the
//! document.
//!
//! ## Example
//!
//! ```rust
//! use tracked_tables::prelude::*;
//!
//! let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
//! tracker
//!     .track(TrackedTable::new(
//!         "ProductsTable",
//!         "Product",
//!         "A1:B1",
//!         vec![
//!             TrackedColumn::unbound("Product"),
//!             TrackedColumn::bound("Caption", "memberCaption"),
//!         ],
//!     ))
//!     .unwrap();
//!
//! // The user renames B1
//! let event = TableChangeEvent::new(ChangeType::RangeEdited, "B1");
//! let header = HeaderSnapshot::new("A1:B1", ["Product", "Member Caption"]);
//! let report = tracker.handle_change("ProductsTable", &event, &header).unwrap().unwrap();
//!
//! assert!(report.changed());
//! let column = &tracker.table("ProductsTable").unwrap().tracked_columns[1];
//! assert_eq!(column.name, "Member Caption");
//! assert!(column.is_dirty);
//! ```

pub mod error;
pub mod options;
pub mod prelude;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use options::TrackerOptions;
pub use tracker::Tracker;

// Re-export core types
pub use tracked_tables_core::{
    CellAddress, CellRange, Error, HistoryEntry, Record, Result, SheetRange, TableChange,
    TrackedColumn, TrackedTable, TrackedTableRegistry,
};

// Re-export reconciliation types
pub use tracked_tables_reconcile::{
    apply_changes, classify, handle_table_change, reconcile, requires_reconcile, ChangeType,
    ColumnChanges, HeaderSnapshot, LookupMiss, ReconcileReport, Rename, TableChangeEvent,
};

// Re-export storage types
pub use tracked_tables_store::{
    MemoryStore, PackageStore, StateStore, StoreError, StoreResult, DEFAULT_NAMESPACE,
    DEFAULT_STATE_KEY,
};

// Re-export worksheet functions
pub use tracked_tables_functions as functions;
