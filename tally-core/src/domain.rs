use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Composite identity for one physical inventory unit. Field order is the
/// presentation sort order: site first, then item, cost element, lot.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub site_code: String,
    pub item_code: String,
    pub cost_element_code: String,
    pub lot_code: String,
}

/// One master-data record. Each row is exactly one physical unit at load
/// time; repeated identity tuples are meaningful (count = initial
/// quantity). Numeric-looking fields stay as captured text and are coerced
/// at reconcile time.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CatalogRow {
    pub item_code: String,
    pub site_code: String,
    pub cost_element_code: String,
    pub lot_code: String,
    pub grade: String,
    pub thickness: String,
    pub width: String,
    pub length: String,
    pub unit_weight: String,
    pub description: String,
    /// Forward-compatible columns not part of the fixed field set.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementKind {
    Inbound,
    Outbound,
    TransferOut,
    TransferIn,
}

impl MovementKind {
    /// Inflows add to the balance, everything else subtracts.
    pub fn is_inflow(self) -> bool {
        matches!(self, MovementKind::Inbound | MovementKind::TransferIn)
    }
}

/// One signed quantity event. Immutable once written; the ledger is
/// append-only.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MovementEvent {
    pub kind: MovementKind,
    pub item_code: String,
    pub site_code: String,
    pub cost_element_code: String,
    pub lot_code: String,
    /// Quantity as captured; parsed with the lenient policy at
    /// reconcile time.
    pub quantity: String,
    /// Unix seconds.
    pub recorded_at: i64,
}

impl MovementEvent {
    /// Stamp a new event with the current wall clock.
    pub fn now(kind: MovementKind, key: ItemKey, quantity: impl Into<String>) -> Self {
        Self {
            kind,
            item_code: key.item_code,
            site_code: key.site_code,
            cost_element_code: key.cost_element_code,
            lot_code: key.lot_code,
            quantity: quantity.into(),
            recorded_at: time::OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

/// Derived, ephemeral balance for one identity. Recomputed on demand,
/// never persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BalanceRow {
    pub key: ItemKey,
    pub grade: String,
    pub thickness: String,
    pub width: String,
    pub length: String,
    pub description: String,
    pub unit_weight: f64,
    pub initial_quantity: i64,
    pub net_movement: f64,
    pub current_quantity: f64,
    pub current_weight: f64,
}
