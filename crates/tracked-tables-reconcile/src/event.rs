//! Table-change notifications from the host
//!
//! The host reports each edit to a table with a change type and the address
//! it touched. Structural changes (rows or columns inserted or deleted) always
//! trigger header reconciliation; value edits and cell shifts only do when
//! they touch the header row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracked_tables_core::{Result, SheetRange, TrackedTable};

use crate::reconcile::{reconcile, ReconcileReport};

/// Kind of edit reported for a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    RangeEdited,
    RowInserted,
    RowDeleted,
    ColumnInserted,
    ColumnDeleted,
    CellInserted,
    CellDeleted,
}

impl ChangeType {
    /// All change types, in host order
    pub const ALL: [ChangeType; 7] = [
        ChangeType::RangeEdited,
        ChangeType::RowInserted,
        ChangeType::RowDeleted,
        ChangeType::ColumnInserted,
        ChangeType::ColumnDeleted,
        ChangeType::CellInserted,
        ChangeType::CellDeleted,
    ];

    /// Host name of the change type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RangeEdited => "RangeEdited",
            Self::RowInserted => "RowInserted",
            Self::RowDeleted => "RowDeleted",
            Self::ColumnInserted => "ColumnInserted",
            Self::ColumnDeleted => "ColumnDeleted",
            Self::CellInserted => "CellInserted",
            Self::CellDeleted => "CellDeleted",
        }
    }

    /// Whether this change reconciles the header regardless of where it happened
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::RowInserted | Self::RowDeleted | Self::ColumnInserted | Self::ColumnDeleted
        )
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized change type name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown change type: {0}")]
pub struct ParseChangeTypeError(pub String);

impl FromStr for ChangeType {
    type Err = ParseChangeTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseChangeTypeError(s.to_string()))
    }
}

/// A change notification for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableChangeEvent {
    pub change_type: ChangeType,
    /// Address of the edited cells, usually without a sheet prefix
    pub address: String,
}

impl TableChangeEvent {
    pub fn new(change_type: ChangeType, address: impl Into<String>) -> Self {
        Self {
            change_type,
            address: address.into(),
        }
    }
}

/// The live header row of a table as read from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSnapshot {
    /// Sheet-qualified address of the header row
    pub address: String,
    /// Header labels in column order
    pub values: Vec<String>,
}

impl HeaderSnapshot {
    pub fn new<S: Into<String>>(address: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            address: address.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Decide whether `event` on a table on `worksheet` needs header reconciliation
pub fn requires_reconcile(
    event: &TableChangeEvent,
    header: &HeaderSnapshot,
    worksheet: &str,
) -> Result<bool> {
    if event.change_type.is_structural() {
        return Ok(true);
    }

    let header_range = SheetRange::qualified(worksheet, &header.address)?;
    let edited = SheetRange::qualified(worksheet, &event.address)?;
    Ok(header_range.intersects(&edited))
}

/// Handle one change notification for `table`.
///
/// Returns `None` when the event does not touch the header.
pub fn handle_table_change(
    table: &mut TrackedTable,
    event: &TableChangeEvent,
    header: &HeaderSnapshot,
) -> Result<Option<ReconcileReport>> {
    if !requires_reconcile(event, header, &table.worksheet_name)? {
        tracing::debug!(
            table = %table.name,
            change = %event.change_type,
            address = %event.address,
            "change does not touch the header"
        );
        return Ok(None);
    }

    Ok(Some(reconcile(table, &header.values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracked_tables_core::TrackedColumn;

    fn table() -> TrackedTable {
        TrackedTable::new(
            "ProductsTable",
            "Product",
            "A1:C1",
            vec![
                TrackedColumn::unbound("Product"),
                TrackedColumn::bound("Code", "primarySystemCode"),
                TrackedColumn::bound("Caption", "memberCaption"),
            ],
        )
    }

    #[test]
    fn test_change_type_parse() {
        assert_eq!("RangeEdited".parse::<ChangeType>().unwrap(), ChangeType::RangeEdited);
        assert_eq!("columninserted".parse::<ChangeType>().unwrap(), ChangeType::ColumnInserted);
        assert!("Unknown".parse::<ChangeType>().is_err());

        for t in ChangeType::ALL {
            assert_eq!(t.to_string().parse::<ChangeType>().unwrap(), t);
        }
    }

    #[test]
    fn test_event_deserializes_from_host_payload() {
        let event: TableChangeEvent =
            serde_json::from_str(r#"{"changeType":"CellDeleted","address":"B1"}"#).unwrap();
        assert_eq!(event, TableChangeEvent::new(ChangeType::CellDeleted, "B1"));
    }

    #[test]
    fn test_range_edit_outside_header_is_ignored() {
        let mut table = table();
        let header = HeaderSnapshot::new("Product!A1:C1", ["Product", "X", "Caption"]);
        let event = TableChangeEvent::new(ChangeType::RangeEdited, "B5");

        assert!(handle_table_change(&mut table, &event, &header).unwrap().is_none());
        assert_eq!(table.tracked_columns[1].name, "Code");
    }

    #[test]
    fn test_range_edit_on_header_reconciles() {
        let mut table = table();
        let header = HeaderSnapshot::new("Product!A1:C1", ["Product", "X", "Caption"]);
        let event = TableChangeEvent::new(ChangeType::RangeEdited, "B1");

        let report = handle_table_change(&mut table, &event, &header).unwrap().unwrap();
        assert!(report.changed());
        assert_eq!(table.tracked_columns[1].name, "X");
    }

    #[test]
    fn test_structural_change_always_reconciles() {
        for change_type in [
            ChangeType::RowInserted,
            ChangeType::RowDeleted,
            ChangeType::ColumnInserted,
            ChangeType::ColumnDeleted,
        ] {
            let event = TableChangeEvent::new(change_type, "A40:C40");
            let header = HeaderSnapshot::new("Product!A1:C1", ["Product", "Code", "Caption"]);
            assert!(requires_reconcile(&event, &header, "Product").unwrap());
        }
    }

    #[test]
    fn test_cell_shift_on_other_sheet_is_ignored() {
        let event = TableChangeEvent::new(ChangeType::CellInserted, "Sales!B1");
        let header = HeaderSnapshot::new("Product!A1:C1", Vec::<String>::new());
        assert!(!requires_reconcile(&event, &header, "Product").unwrap());
    }

    #[test]
    fn test_bad_address_is_an_error() {
        let mut table = table();
        let event = TableChangeEvent::new(ChangeType::RangeEdited, "??");
        let header = HeaderSnapshot::new("Product!A1:C1", ["Product"]);
        assert!(handle_table_change(&mut table, &event, &header).is_err());
    }
}
