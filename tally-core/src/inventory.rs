use std::sync::Arc;

use crate::backend::Backend;
use crate::balance::{BalanceFilter, BalanceSummary, reconcile, summarize};
use crate::domain::{BalanceRow, CatalogRow, MovementEvent};
use crate::error::Result;
use crate::ledger::MovementLedger;
use crate::snapshot::{SnapshotOptions, SnapshotStore, SyncReport};
use crate::table::Table;

pub const MASTER_CATALOG: &str = "master_catalog";

/// Facade wiring the snapshot store, the movement ledger and the balance
/// engine over one shared backend. One instance per snapshot key; no
/// global state.
pub struct Inventory {
    backend: Arc<dyn Backend>,
    snapshots: SnapshotStore,
    ledger: MovementLedger,
    snapshot_key: String,
}

impl Inventory {
    pub fn open(backend: Arc<dyn Backend>) -> Self {
        Self::with_options(backend, MASTER_CATALOG, SnapshotOptions::default())
    }

    pub fn with_options(backend: Arc<dyn Backend>, snapshot_key: &str, opts: SnapshotOptions) -> Self {
        Self {
            snapshots: SnapshotStore::with_options(backend.clone(), opts),
            ledger: MovementLedger::new(backend.clone()),
            backend,
            snapshot_key: snapshot_key.to_string(),
        }
    }

    /// Replace the whole catalog snapshot. Inherits the snapshot store's
    /// non-atomic delete-then-write behavior.
    pub fn replace_catalog(&self, rows: Vec<CatalogRow>) -> Result<SyncReport> {
        let n = rows.len();
        let table = Table::new(rows);
        let report = self.snapshots.replace(&self.snapshot_key, &table.to_bytes()?)?;
        tracing::info!(rows = n, key = %self.snapshot_key, "catalog replaced");
        Ok(report)
    }

    pub fn read_catalog(&self) -> Result<Table> {
        Table::from_bytes(&self.snapshots.read(&self.snapshot_key)?)
    }

    pub fn clear_catalog(&self) -> Result<u64> {
        self.snapshots.clear(&self.snapshot_key)
    }

    pub fn record_movement(&self, event: &MovementEvent) -> Result<String> {
        self.ledger.record(event)
    }

    pub fn movements(&self) -> Result<Vec<MovementEvent>> {
        self.ledger.all()?.collect()
    }

    /// Current balance table. A missing snapshot surfaces as
    /// `EmptySnapshot` so callers can tell "load a catalog first" apart
    /// from a store fault.
    pub fn balances(&self, filter: Option<&BalanceFilter>) -> Result<Vec<BalanceRow>> {
        let table = self.read_catalog()?;
        let movements = self.movements()?;
        let mut rows = reconcile(&table.rows, &movements);
        if let Some(f) = filter {
            rows.retain(|r| f.matches(r));
        }
        Ok(rows)
    }

    pub fn summary(&self, filter: Option<&BalanceFilter>) -> Result<BalanceSummary> {
        Ok(summarize(&self.balances(filter)?))
    }

    /// Backend connectivity probe.
    pub fn status(&self) -> Result<()> {
        self.backend.ping()
    }
}
