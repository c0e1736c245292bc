//! Tracked table type and its change history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::TrackedColumn;
use crate::error::{Error, Result};

/// One row of source data: field name to value
pub type Record = serde_json::Map<String, Value>;

/// A spreadsheet table whose columns are kept in sync with a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTable {
    /// Table name, unique within a registry
    pub name: String,
    /// Worksheet the table lives on
    #[serde(alias = "worksheet")]
    pub worksheet_name: String,
    /// Address of the table on its worksheet (e.g. `A1:C1`)
    pub range: String,
    /// Cached snapshot of the live header labels
    #[serde(default)]
    pub columns: Vec<String>,
    /// Column configuration, in header order
    #[serde(default)]
    pub tracked_columns: Vec<TrackedColumn>,
    /// Cached source rows
    #[serde(default)]
    pub rows: Vec<Record>,
    /// Columns removed from the header, oldest first
    #[serde(
        default,
        rename = "removedTrackedColumns",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub removed_columns: Vec<TrackedColumn>,
    /// Log of reconciled header changes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

/// A reconciled header change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableChange {
    /// A column label changed
    Renamed { before: String, after: String },
    /// A new, unbound column appeared
    Inserted { name: String },
    /// A column disappeared from the header
    Deleted { name: String },
    /// Columns moved to a different position
    Reordered { columns: Vec<String> },
}

/// A [`TableChange`] with the time it was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub change: TableChange,
}

impl HistoryEntry {
    /// Stamp a change with the current time
    pub fn now(change: TableChange) -> Self {
        Self {
            at: Utc::now(),
            change,
        }
    }
}

impl TrackedTable {
    /// Create a table from its column configuration.
    ///
    /// The header snapshot is derived from the column names.
    pub fn new(
        name: impl Into<String>,
        worksheet_name: impl Into<String>,
        range: impl Into<String>,
        tracked_columns: Vec<TrackedColumn>,
    ) -> Self {
        let columns = tracked_columns.iter().map(|c| c.name.clone()).collect();
        Self {
            name: name.into(),
            worksheet_name: worksheet_name.into(),
            range: range.into(),
            columns,
            tracked_columns,
            rows: Vec::new(),
            removed_columns: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Check the table definition for problems that would break reconciliation
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_table(&self.name, "table name is empty"));
        }
        if self.worksheet_name.trim().is_empty() {
            return Err(Error::invalid_table(&self.name, "worksheet name is empty"));
        }
        crate::address::SheetRange::parse(&self.range)?;
        for (i, col) in self.tracked_columns.iter().enumerate() {
            if self.tracked_columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::invalid_table(
                    &self.name,
                    format!("duplicate column '{}'", col.name),
                ));
            }
        }
        Ok(())
    }

    /// Header labels as written when the table is created
    pub fn header_values(&self) -> Vec<String> {
        self.tracked_columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Find a tracked column by its current label
    pub fn column(&self, name: &str) -> Option<&TrackedColumn> {
        self.tracked_columns.iter().find(|c| c.name == name)
    }

    /// Find a tracked column by its current label, mutably
    pub fn column_mut(&mut self, name: &str) -> Option<&mut TrackedColumn> {
        self.tracked_columns.iter_mut().find(|c| c.name == name)
    }

    /// Position of a tracked column by its current label
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.tracked_columns.iter().position(|c| c.name == name)
    }

    /// Whether the column configuration matches the header snapshot one-to-one
    pub fn is_consistent(&self) -> bool {
        self.tracked_columns.len() == self.columns.len()
            && self
                .tracked_columns
                .iter()
                .zip(&self.columns)
                .all(|(tc, name)| &tc.name == name)
    }

    /// Replace the cached source rows
    pub fn replace_rows(&mut self, rows: Vec<Record>) {
        self.rows = rows;
    }

    /// Project each cached row through the tracked columns.
    ///
    /// Bound columns take the row's value for their source field; unbound
    /// columns and missing fields yield `None`.
    pub fn project_rows(&self) -> Vec<Vec<Option<Value>>> {
        self.rows
            .iter()
            .map(|row| {
                self.tracked_columns
                    .iter()
                    .map(|col| col.source.as_ref().and_then(|s| row.get(s).cloned()))
                    .collect()
            })
            .collect()
    }

    /// Iterate over deletions recorded in the history log
    pub fn deletions(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history
            .iter()
            .filter(|e| matches!(e.change, TableChange::Deleted { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn products() -> TrackedTable {
        TrackedTable::new(
            "ProductsTable",
            "Product",
            "A1:C1",
            vec![
                TrackedColumn::unbound("Product"),
                TrackedColumn::bound("Primary System Code", "primarySystemCode"),
                TrackedColumn::bound("Member Caption", "memberCaption"),
            ],
        )
    }

    #[test]
    fn test_new_derives_header_snapshot() {
        let table = products();
        assert_eq!(
            table.columns,
            vec!["Product", "Primary System Code", "Member Caption"]
        );
        assert_eq!(table.header_values(), table.columns);
        assert!(table.is_consistent());
        table.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_range() {
        let mut table = products();
        table.tracked_columns.push(TrackedColumn::unbound("Product"));
        assert!(table.validate().is_err());

        let mut table = products();
        table.range = "not a range".into();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_project_rows() {
        let mut table = products();
        let row = json!({"primarySystemCode": "P-1", "memberCaption": "Chai", "extra": 1});
        table.replace_rows(vec![row.as_object().unwrap().clone()]);

        assert_eq!(
            table.project_rows(),
            vec![vec![None, Some(json!("P-1")), Some(json!("Chai"))]]
        );
    }

    #[test]
    fn test_serde_accepts_legacy_worksheet_field() {
        let table: TrackedTable = serde_json::from_value(json!({
            "name": "ProductsTable",
            "worksheet": "Product",
            "range": "A1:C1",
            "columns": ["Product"],
            "trackedColumns": [{"name": "Product", "source": null, "isDirty": false}],
            "rows": []
        }))
        .unwrap();

        assert_eq!(table.worksheet_name, "Product");
        assert!(table.is_consistent());

        let out = serde_json::to_value(&table).unwrap();
        assert_eq!(out["worksheetName"], json!("Product"));
        assert!(out.get("history").is_none());
    }

    #[test]
    fn test_history_entry_shape() {
        let entry = HistoryEntry::now(TableChange::Renamed {
            before: "B".into(),
            after: "X".into(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], json!("renamed"));
        assert_eq!(value["before"], json!("B"));

        let back: HistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
