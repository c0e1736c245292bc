//! Applying classified header changes to a tracked table

use tracked_tables_core::{HistoryEntry, TableChange, TrackedColumn, TrackedTable};

use crate::classify::{classify, ColumnChanges, Rename};

/// A change that referenced a column the table does not track
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    Rename(Rename),
    Delete(String),
}

/// Outcome of reconciling a table against a new header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The classification that was applied
    pub changes: ColumnChanges,
    /// Renames and deletions that were skipped because no column matched
    pub missed: Vec<LookupMiss>,
    /// Labels that became new unbound columns
    pub inserted: Vec<String>,
    /// Columns dropped from the configuration
    pub removed: Vec<TrackedColumn>,
    changed: bool,
}

impl ReconcileReport {
    /// Whether the table was mutated.
    ///
    /// Callers persist state and reapply formatting only when this is true.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

/// Reconcile `table` against the live header labels `after`.
///
/// The "before" side is taken from the table's tracked columns.
pub fn reconcile<S: AsRef<str>>(table: &mut TrackedTable, after: &[S]) -> ReconcileReport {
    let before = table.header_values();
    let changes = classify(&before, after);
    apply_changes(table, changes, after)
}

/// Apply a precomputed classification to `table`, then align its columns to `after`.
///
/// After this returns, `table.tracked_columns` and `table.columns` both follow
/// `after` one-to-one.
pub fn apply_changes<S: AsRef<str>>(
    table: &mut TrackedTable,
    changes: ColumnChanges,
    after: &[S],
) -> ReconcileReport {
    let after: Vec<String> = after.iter().map(|s| s.as_ref().to_string()).collect();
    let original_columns = table.tracked_columns.clone();
    let original_snapshot = table.columns.clone();

    let mut report = ReconcileReport::default();

    for rename in &changes.renamed {
        rename_column(table, rename, &mut report);
    }
    for name in &changes.deleted {
        delete_column(table, name, &mut report);
    }

    resequence(table, &after, &mut report);

    if !changes.reordered.is_empty() {
        table.history.push(HistoryEntry::now(TableChange::Reordered {
            columns: changes.reordered.clone(),
        }));
    }

    table.columns = after;

    report.changed =
        table.tracked_columns != original_columns || table.columns != original_snapshot;
    report.changes = changes;

    tracing::debug!(
        table = %table.name,
        changed = report.changed,
        renamed = report.changes.renamed.len(),
        inserted = report.inserted.len(),
        removed = report.removed.len(),
        missed = report.missed.len(),
        "reconciled header"
    );

    report
}

fn rename_column(table: &mut TrackedTable, rename: &Rename, report: &mut ReconcileReport) {
    let Some(column) = table.column_mut(&rename.before) else {
        tracing::warn!(
            table = %table.name,
            before = %rename.before,
            after = %rename.after,
            "rename refers to an untracked column, skipping"
        );
        report.missed.push(LookupMiss::Rename(rename.clone()));
        return;
    };

    column.rename(rename.after.clone());
    if column.is_bound() {
        column.is_dirty = true;
    }

    table.history.push(HistoryEntry::now(TableChange::Renamed {
        before: rename.before.clone(),
        after: rename.after.clone(),
    }));
}

fn delete_column(table: &mut TrackedTable, name: &str, report: &mut ReconcileReport) {
    let Some(index) = table.column_index(name) else {
        tracing::warn!(
            table = %table.name,
            column = %name,
            "deletion refers to an untracked column, skipping"
        );
        report.missed.push(LookupMiss::Delete(name.to_string()));
        return;
    };

    let removed = table.tracked_columns.remove(index);
    record_removal(table, removed, report);
}

fn record_removal(table: &mut TrackedTable, column: TrackedColumn, report: &mut ReconcileReport) {
    table.history.push(HistoryEntry::now(TableChange::Deleted {
        name: column.name.clone(),
    }));
    table.removed_columns.push(column.clone());
    report.removed.push(column);
}

/// Rebuild the tracked columns in `after` order.
///
/// Labels with no matching column become unbound columns; columns whose label
/// no longer appears are dropped into the deletion history.
fn resequence(table: &mut TrackedTable, after: &[String], report: &mut ReconcileReport) {
    let mut pool: Vec<Option<TrackedColumn>> = std::mem::take(&mut table.tracked_columns)
        .into_iter()
        .map(Some)
        .collect();

    let mut sequenced = Vec::with_capacity(after.len());
    for label in after {
        let existing = pool
            .iter_mut()
            .find(|slot| matches!(slot, Some(c) if &c.name == label))
            .and_then(Option::take);

        match existing {
            Some(column) => sequenced.push(column),
            None => {
                table.history.push(HistoryEntry::now(TableChange::Inserted {
                    name: label.clone(),
                }));
                report.inserted.push(label.clone());
                sequenced.push(TrackedColumn::unbound(label.clone()));
            }
        }
    }

    table.tracked_columns = sequenced;

    for leftover in pool.into_iter().flatten() {
        tracing::debug!(table = %table.name, column = %leftover.name, "dropping unmatched column");
        record_removal(table, leftover, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

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
    fn test_rename_preserves_source_binding() {
        let mut table = products();
        let report = reconcile(&mut table, &["Product", "Code", "Member Caption"]);

        assert!(report.changed());
        let col = &table.tracked_columns[1];
        assert_eq!(col.name, "Code");
        assert_eq!(col.source.as_deref(), Some("primarySystemCode"));
        assert_eq!(col.name_history, vec!["Primary System Code"]);
        assert!(col.is_dirty);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_rename_of_unbound_column_stays_clean() {
        let mut table = products();
        reconcile(&mut table, &["Item", "Primary System Code", "Member Caption"]);

        assert_eq!(table.tracked_columns[0].name, "Item");
        assert!(!table.tracked_columns[0].is_dirty);
    }

    #[test]
    fn test_delete_moves_column_to_history() {
        let mut table = products();
        let report = reconcile(&mut table, &["Product", "Member Caption"]);

        assert!(report.changed());
        assert_eq!(table.tracked_columns.len(), 2);
        assert_eq!(table.removed_columns.len(), 1);
        assert_eq!(table.removed_columns[0].name, "Primary System Code");
        assert_eq!(table.deletions().count(), 1);
        assert_eq!(report.removed.len(), 1);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_insert_adds_unbound_column_in_position() {
        let mut table = products();
        let report = reconcile(
            &mut table,
            &["Product", "Notes", "Primary System Code", "Member Caption"],
        );

        assert_eq!(report.inserted, vec!["Notes"]);
        assert_eq!(table.tracked_columns[1], TrackedColumn::unbound("Notes"));
        assert_eq!(
            table.tracked_columns[2].source.as_deref(),
            Some("primarySystemCode")
        );
        assert!(table.is_consistent());
    }

    #[test]
    fn test_reorder_follows_header() {
        let mut table = products();
        let report = reconcile(
            &mut table,
            &["Member Caption", "Product", "Primary System Code"],
        );

        assert!(report.changed());
        assert!(report.changes.renamed.is_empty());
        assert_eq!(
            table.tracked_columns[0].source.as_deref(),
            Some("memberCaption")
        );
        assert!(table.is_consistent());
        assert!(matches!(
            table.history.last().map(|e| &e.change),
            Some(TableChange::Reordered { .. })
        ));
    }

    #[test]
    fn test_second_application_is_idempotent() {
        let mut table = products();
        let after = ["Product", "Code", "Notes", "Member Caption", "Extra"];

        assert!(reconcile(&mut table, &after).changed());
        let columns = table.tracked_columns.clone();
        let history_len = table.history.len();

        let report = reconcile(&mut table, &after);
        assert!(!report.changed());
        assert!(!report.changes.has_changes());
        assert_eq!(table.tracked_columns, columns);
        assert_eq!(table.history.len(), history_len);
    }

    #[test]
    fn test_apply_changes_reports_lookup_misses() {
        let mut table = products();
        let changes = ColumnChanges {
            renamed: vec![Rename::new("Ghost", "Phantom")],
            deleted: vec!["Missing".into()],
            ..Default::default()
        };
        let header = table.header_values();

        let report = apply_changes(&mut table, changes, &header);
        assert_eq!(
            report.missed,
            vec![
                LookupMiss::Rename(Rename::new("Ghost", "Phantom")),
                LookupMiss::Delete("Missing".into()),
            ]
        );
        assert!(!report.changed());
        assert_eq!(table, products());
    }

    #[test]
    fn test_stale_snapshot_is_refreshed() {
        let mut table = products();
        table.columns = vec!["stale".into()];

        let header = table.header_values();
        let report = reconcile(&mut table, &header);
        assert!(report.changed());
        assert!(!report.changes.has_changes());
        assert!(table.is_consistent());
    }
}
