//! # tracked-tables-core
//!
//! Core data model for tracked spreadsheet tables.
//!
//! This crate provides the types shared by the rest of tracked-tables:
//! - [`TrackedColumn`] - A header column, optionally bound to a source field
//! - [`TrackedTable`] - A table, its column configuration, rows and history
//! - [`TrackedTableRegistry`] - The tracked tables of one document
//! - [`CellAddress`], [`CellRange`], [`SheetRange`] - A1-style addressing
//!
//! ## Example
//!
//! ```rust
//! use tracked_tables_core::{TrackedColumn, TrackedTable, TrackedTableRegistry};
//!
//! let mut registry = TrackedTableRegistry::new();
//! registry
//!     .insert(TrackedTable::new(
//!         "ProductsTable",
//!         "Product",
//!         "A1:B1",
//!         vec![
//!             TrackedColumn::unbound("Product"),
//!             TrackedColumn::bound("Member Caption", "memberCaption"),
//!         ],
//!     ))
//!     .unwrap();
//!
//! assert_eq!(registry.get("ProductsTable").unwrap().columns.len(), 2);
//! ```

pub mod address;
pub mod column;
pub mod error;
pub mod registry;
pub mod table;

pub use address::{CellAddress, CellRange, SheetRange};
pub use column::TrackedColumn;
pub use error::{Error, Result};
pub use registry::TrackedTableRegistry;
pub use table::{HistoryEntry, Record, TableChange, TrackedTable};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
