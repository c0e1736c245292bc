//! Tracker session

use tracked_tables_core::{TrackedTable, TrackedTableRegistry};
use tracked_tables_reconcile::{
    handle_table_change, reconcile, HeaderSnapshot, ReconcileReport, TableChangeEvent,
};
use tracked_tables_store::{clear_registry, load_registry, save_registry, StateStore};

use crate::error::{TrackerError, TrackerResult};
use crate::options::TrackerOptions;

/// The tracked tables of one document, bound to the store they persist to.
///
/// Every mutation that changes the registry is written back to the store
/// before the call returns, unless `persist_on_change` is off.
#[derive(Debug)]
pub struct Tracker<S: StateStore> {
    registry: TrackedTableRegistry,
    store: S,
    options: TrackerOptions,
}

impl<S: StateStore> Tracker<S> {
    /// Create a tracker with an empty registry. Nothing is read from `store`.
    pub fn new(store: S, options: TrackerOptions) -> Self {
        Self {
            registry: TrackedTableRegistry::new(),
            store,
            options,
        }
    }

    /// Create a tracker from the registry persisted in `store`, if any
    pub fn open(store: S, options: TrackerOptions) -> TrackerResult<Self> {
        let registry = load_registry(&store, &options.state_key)?.unwrap_or_default();
        tracing::debug!(
            key = %options.state_key,
            tables = registry.len(),
            "loaded tracked tables"
        );
        Ok(Self {
            registry,
            store,
            options,
        })
    }

    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    pub fn registry(&self) -> &TrackedTableRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the tracker, returning its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Look up a tracked table by name
    pub fn table(&self, name: &str) -> Option<&TrackedTable> {
        self.registry.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TrackedTable> {
        self.registry.iter()
    }

    /// Start tracking `table` and persist the registry
    pub fn track(&mut self, table: TrackedTable) -> TrackerResult<()> {
        let name = table.name.clone();
        self.registry.insert(table)?;
        tracing::info!(table = %name, "tracking table");
        self.save()
    }

    /// Stop tracking a table and persist the registry
    pub fn untrack(&mut self, name: &str) -> TrackerResult<TrackedTable> {
        let table = self
            .registry
            .remove(name)
            .ok_or_else(|| TrackerError::UnknownTable(name.to_string()))?;
        tracing::info!(table = %name, "stopped tracking table");
        self.save()?;
        Ok(table)
    }

    /// Handle a change notification for the table called `name`.
    ///
    /// Returns `None` when the change does not touch the header. The
    /// registry is persisted only when the reconciliation changed the table.
    pub fn handle_change(
        &mut self,
        name: &str,
        event: &TableChangeEvent,
        header: &HeaderSnapshot,
    ) -> TrackerResult<Option<ReconcileReport>> {
        let table = self
            .registry
            .get_mut(name)
            .ok_or_else(|| TrackerError::UnknownTable(name.to_string()))?;

        let Some(report) = handle_table_change(table, event, header)? else {
            return Ok(None);
        };

        self.after_reconcile(name, &report)?;
        Ok(Some(report))
    }

    /// Reconcile the table called `name` against a header row directly
    pub fn reconcile_header<L: AsRef<str>>(
        &mut self,
        name: &str,
        header: &[L],
    ) -> TrackerResult<ReconcileReport> {
        let table = self
            .registry
            .get_mut(name)
            .ok_or_else(|| TrackerError::UnknownTable(name.to_string()))?;

        let report = reconcile(table, header);
        self.after_reconcile(name, &report)?;
        Ok(report)
    }

    fn after_reconcile(&mut self, name: &str, report: &ReconcileReport) -> TrackerResult<()> {
        if !report.changed() {
            tracing::debug!(table = %name, "header unchanged");
            return Ok(());
        }

        tracing::info!(
            table = %name,
            renamed = report.changes.renamed.len(),
            inserted = report.inserted.len(),
            removed = report.removed.len(),
            "reconciled header"
        );

        if self.options.persist_on_change {
            self.save()?;
        }
        Ok(())
    }

    /// Write the registry to the store
    pub fn save(&mut self) -> TrackerResult<()> {
        save_registry(&mut self.store, &self.options.state_key, &self.registry)?;
        tracing::debug!(key = %self.options.state_key, tables = self.registry.len(), "saved tracked tables");
        Ok(())
    }

    /// Forget every tracked table, both in memory and in the store
    pub fn reset(&mut self) -> TrackerResult<()> {
        clear_registry(&mut self.store, &self.options.state_key)?;
        self.registry.clear();
        tracing::info!(key = %self.options.state_key, "cleared tracked tables");
        Ok(())
    }
}
