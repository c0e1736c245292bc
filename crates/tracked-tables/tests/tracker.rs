//! Tracker sessions against real stores

use pretty_assertions::assert_eq;
use tracked_tables::prelude::*;
use tracked_tables::{Error, LookupMiss, StoreError, StoreResult, TableChange};

fn products() -> TrackedTable {
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

/// A store whose writes can be switched off
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    offline: bool,
}

impl StateStore for FlakyStore {
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Unavailable("document is read-only".into()));
        }
        self.inner.save(key, state)
    }

    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.load(key)
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        self.inner.clear(key)
    }
}

#[test]
fn test_state_survives_reopen_from_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    let options = TrackerOptions::default();

    let mut tracker = Tracker::new(options.package_store(&path), options.clone());
    tracker.track(products()).unwrap();
    tracker
        .reconcile_header("ProductsTable", &["Product", "Code", "Member Caption"])
        .unwrap();
    drop(tracker);

    let tracker = Tracker::open(options.package_store(&path), options).unwrap();
    let table = tracker.table("ProductsTable").unwrap();
    assert_eq!(table.columns, vec!["Product", "Code", "Member Caption"]);
    assert_eq!(table.tracked_columns[2].name_history, vec!["Caption"]);
    assert!(table.tracked_columns[2].is_dirty);
}

#[test]
fn test_open_without_state_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let options = TrackerOptions::default();
    let tracker = Tracker::open(options.package_store(dir.path().join("new.xlsx")), options).unwrap();
    assert!(tracker.registry().is_empty());
}

#[test]
fn test_header_edit_outside_header_is_ignored() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();

    let event = TableChangeEvent::new(ChangeType::RangeEdited, "Product!B7");
    let header = HeaderSnapshot::new("A1:C1", ["Product", "Renamed", "Caption"]);
    assert!(tracker
        .handle_change("ProductsTable", &event, &header)
        .unwrap()
        .is_none());
    assert_eq!(tracker.table("ProductsTable").unwrap().columns[1], "Code");
}

#[test]
fn test_column_deleted_event() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();

    let event = TableChangeEvent::new(ChangeType::ColumnDeleted, "B:B");
    let header = HeaderSnapshot::new("A1:B1", ["Product", "Caption"]);
    let report = tracker
        .handle_change("ProductsTable", &event, &header)
        .unwrap()
        .unwrap();

    assert!(report.changed());
    assert_eq!(report.changes.deleted, vec!["Code"]);
    assert!(report.missed.is_empty());

    let table = tracker.table("ProductsTable").unwrap();
    assert_eq!(table.removed_columns.len(), 1);
    assert_eq!(table.removed_columns[0].source.as_deref(), Some("primarySystemCode"));
    assert_eq!(table.deletions().count(), 1);
    assert!(table.is_consistent());
}

#[test]
fn test_reconcile_is_idempotent() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();
    let header = ["Product", "Caption", "Code", "Notes"];

    assert!(tracker.reconcile_header("ProductsTable", &header).unwrap().changed());
    let saved = tracker.store().load("TrackedTables").unwrap();
    let history = tracker.table("ProductsTable").unwrap().history.len();

    let again = tracker.reconcile_header("ProductsTable", &header).unwrap();
    assert!(!again.changed());
    assert!(!again.changes.has_changes());
    assert_eq!(tracker.store().load("TrackedTables").unwrap(), saved);
    assert_eq!(tracker.table("ProductsTable").unwrap().history.len(), history);
}

#[test]
fn test_insertion_adds_unbound_column() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();

    let report = tracker
        .reconcile_header("ProductsTable", &["Product", "Code", "Caption", "Notes"])
        .unwrap();
    assert_eq!(report.inserted, vec!["Notes"]);

    let table = tracker.table("ProductsTable").unwrap();
    let notes = table.column("Notes").unwrap();
    assert!(!notes.is_bound());
    assert!(matches!(
        table.history.last().map(|h| &h.change),
        Some(TableChange::Inserted { name }) if name == "Notes"
    ));
}

#[test]
fn test_store_failure_is_propagated() {
    let mut tracker = Tracker::new(FlakyStore::default(), TrackerOptions::default());
    tracker.track(products()).unwrap();

    tracker.store_mut().offline = true;
    let err = tracker
        .reconcile_header("ProductsTable", &["Product", "Code", "Label"])
        .unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::Unavailable(_))));

    tracker.store_mut().offline = false;
    tracker.save().unwrap();
    let reopened = Tracker::open(tracker.into_store(), TrackerOptions::default()).unwrap();
    assert_eq!(
        reopened.table("ProductsTable").unwrap().columns,
        vec!["Product", "Code", "Label"]
    );
}

#[test]
fn test_duplicate_track_is_rejected() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();
    assert!(matches!(
        tracker.track(products()),
        Err(TrackerError::Core(Error::DuplicateTable(_)))
    ));
}

#[test]
fn test_untrack_and_reset() {
    let mut tracker = Tracker::new(MemoryStore::new(), TrackerOptions::default());
    tracker.track(products()).unwrap();
    tracker
        .track(TrackedTable::new(
            "Orders",
            "Orders",
            "A1:A1",
            vec![TrackedColumn::unbound("Id")],
        ))
        .unwrap();

    let removed = tracker.untrack("Orders").unwrap();
    assert_eq!(removed.name, "Orders");
    let reopened = Tracker::open(tracker.store().clone(), TrackerOptions::default()).unwrap();
    assert_eq!(reopened.registry().len(), 1);

    tracker.reset().unwrap();
    assert!(tracker.registry().is_empty());
    assert_eq!(tracker.store().load("TrackedTables").unwrap(), None);
}

#[test]
fn test_missing_rename_source_is_reported() {
    let mut table = products();
    table.columns[1] = "Stale".into();
    let report = tracked_tables::apply_changes(
        &mut table,
        tracked_tables::classify(&["Product", "Stale", "Caption"], &["Product", "New", "Caption"]),
        &["Product", "New", "Caption"],
    );

    assert_eq!(
        report.missed,
        vec![LookupMiss::Rename(tracked_tables::Rename::new("Stale", "New"))]
    );
    assert!(table.is_consistent());
}
