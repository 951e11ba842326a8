use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{BalanceRow, CatalogRow, ItemKey, MovementEvent};
use crate::policy::NumberPolicy;

/// Matching is case- and whitespace-insensitive; unnormalized keys would
/// silently fragment one physical identity into multiple rows.
fn norm(s: &str) -> String {
    s.trim().to_uppercase()
}

fn key_of_row(row: &CatalogRow) -> ItemKey {
    ItemKey {
        site_code: norm(&row.site_code),
        item_code: norm(&row.item_code),
        cost_element_code: norm(&row.cost_element_code),
        lot_code: norm(&row.lot_code),
    }
}

fn key_of_event(ev: &MovementEvent) -> ItemKey {
    ItemKey {
        site_code: norm(&ev.site_code),
        item_code: norm(&ev.item_code),
        cost_element_code: norm(&ev.cost_element_code),
        lot_code: norm(&ev.lot_code),
    }
}

/// First-observed representative values for one identity group. The
/// design assumes these are homogeneous within a group; divergence is
/// undefined behavior, not validated.
struct CatalogGroup {
    count: i64,
    grade: String,
    thickness: String,
    width: String,
    length: String,
    description: String,
    unit_weight_raw: String,
}

/// Pure, stateless projection of catalog + ledger into the current
/// balance table. Calling it twice with the same inputs yields the same
/// output, in the same order.
pub fn reconcile(catalog: &[CatalogRow], movements: &[MovementEvent]) -> Vec<BalanceRow> {
    let policy = NumberPolicy::Lenient;

    let mut groups: BTreeMap<ItemKey, CatalogGroup> = BTreeMap::new();
    for row in catalog {
        groups
            .entry(key_of_row(row))
            .or_insert_with(|| CatalogGroup {
                count: 0,
                grade: norm(&row.grade),
                thickness: norm(&row.thickness),
                width: norm(&row.width),
                length: norm(&row.length),
                description: row.description.trim().to_string(),
                unit_weight_raw: row.unit_weight.clone(),
            })
            .count += 1;
    }

    let mut net: BTreeMap<ItemKey, f64> = BTreeMap::new();
    for ev in movements {
        let qty = policy.parse(&ev.quantity);
        let impact = if ev.kind.is_inflow() { qty } else { -qty };
        *net.entry(key_of_event(ev)).or_insert(0.0) += impact;
    }

    // Outer join on the identity key. ItemKey orders site-first, so the
    // BTreeSet walk is already the presentation order.
    let keys: BTreeSet<&ItemKey> = groups.keys().chain(net.keys()).collect();

    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let group = groups.get(key);
        let initial_quantity = group.map_or(0, |g| g.count);
        let net_movement = net.get(key).copied().unwrap_or(0.0);
        let current_quantity = initial_quantity as f64 + net_movement;
        if current_quantity <= 0.0 {
            continue;
        }
        let unit_weight = group.map_or(0.0, |g| policy.parse(&g.unit_weight_raw));
        out.push(BalanceRow {
            key: key.clone(),
            grade: group.map_or(String::new(), |g| g.grade.clone()),
            thickness: group.map_or(String::new(), |g| g.thickness.clone()),
            width: group.map_or(String::new(), |g| g.width.clone()),
            length: group.map_or(String::new(), |g| g.length.clone()),
            description: group.map_or(String::new(), |g| g.description.clone()),
            unit_weight,
            initial_quantity,
            net_movement,
            current_quantity,
            current_weight: current_quantity * unit_weight,
        });
    }
    out
}

/// Optional per-field value sets; an empty set leaves that field
/// unconstrained. Values match case- and whitespace-insensitively.
#[derive(Clone, Debug, Default)]
pub struct BalanceFilter {
    pub sites: Vec<String>,
    pub items: Vec<String>,
    pub cost_elements: Vec<String>,
    pub lots: Vec<String>,
}

impl BalanceFilter {
    pub fn matches(&self, row: &BalanceRow) -> bool {
        field_matches(&self.sites, &row.key.site_code)
            && field_matches(&self.items, &row.key.item_code)
            && field_matches(&self.cost_elements, &row.key.cost_element_code)
            && field_matches(&self.lots, &row.key.lot_code)
    }
}

fn field_matches(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| norm(a) == value)
}

/// Headline totals over a balance table.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct BalanceSummary {
    pub pieces: f64,
    pub weight: f64,
}

pub fn summarize(rows: &[BalanceRow]) -> BalanceSummary {
    BalanceSummary {
        pieces: rows.iter().map(|r| r.current_quantity).sum(),
        weight: rows.iter().map(|r| r.current_weight).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovementKind;

    fn row(item: &str, site: &str, cost: &str) -> CatalogRow {
        CatalogRow {
            item_code: item.into(),
            site_code: site.into(),
            cost_element_code: cost.into(),
            lot_code: "L1".into(),
            grade: "A36".into(),
            thickness: "12.7".into(),
            width: "1500".into(),
            length: "6000".into(),
            unit_weight: "100,5".into(),
            description: "steel plate".into(),
            ..Default::default()
        }
    }

    fn movement(kind: MovementKind, item: &str, site: &str, cost: &str, qty: &str) -> MovementEvent {
        MovementEvent {
            kind,
            item_code: item.into(),
            site_code: site.into(),
            cost_element_code: cost.into(),
            lot_code: "L1".into(),
            quantity: qty.into(),
            recorded_at: 1_700_000_000,
        }
    }

    #[test]
    fn three_rows_no_movements() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
        ];
        let out = reconcile(&catalog, &[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].initial_quantity, 3);
        assert_eq!(out[0].net_movement, 0.0);
        assert_eq!(out[0].current_quantity, 3.0);
        assert_eq!(out[0].current_weight, 3.0 * 100.5);
    }

    #[test]
    fn outbound_reduces_balance() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
        ];
        let moves = vec![movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", "2")];
        let out = reconcile(&catalog, &moves);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].current_quantity, 1.0);
        assert_eq!(out[0].net_movement, -2.0);
    }

    #[test]
    fn overdrawn_identity_is_filtered_out() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
        ];
        let moves = vec![movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", "5")];
        assert!(reconcile(&catalog, &moves).is_empty());
    }

    #[test]
    fn conservation_with_inbound_and_outbound() {
        let catalog = vec![row("MAT-1", "SITE-A", "PEP-1"); 4];
        let moves = vec![
            movement(MovementKind::Inbound, "MAT-1", "SITE-A", "PEP-1", "3"),
            movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", "2"),
            movement(MovementKind::Inbound, "MAT-1", "SITE-A", "PEP-1", "1"),
        ];
        let out = reconcile(&catalog, &moves);
        assert_eq!(out[0].current_quantity, 4.0 + 3.0 - 2.0 + 1.0);
    }

    #[test]
    fn transfers_are_signed_like_in_and_out() {
        let catalog = vec![row("MAT-1", "SITE-A", "PEP-1"); 2];
        let moves = vec![
            movement(MovementKind::TransferOut, "MAT-1", "SITE-A", "PEP-1", "1"),
            movement(MovementKind::TransferIn, "MAT-1", "SITE-B", "PEP-1", "1"),
        ];
        let out = reconcile(&catalog, &moves);
        assert_eq!(out.len(), 2);
        // SITE-A keeps 1, SITE-B appears with no catalog baseline.
        assert_eq!(out[0].key.site_code, "SITE-A");
        assert_eq!(out[0].current_quantity, 1.0);
        assert_eq!(out[1].key.site_code, "SITE-B");
        assert_eq!(out[1].initial_quantity, 0);
        assert_eq!(out[1].current_quantity, 1.0);
        assert_eq!(out[1].unit_weight, 0.0);
    }

    #[test]
    fn normalization_merges_ragged_identities() {
        let catalog = vec![
            row("mat-1", "site-a", "pep-1"),
            row("  MAT-1  ", "SITE-A", "PEP-1"),
            row("Mat-1", " Site-A", "Pep-1"),
        ];
        let moves = vec![movement(MovementKind::Outbound, " mat-1 ", "SITE-a", "pep-1", "1")];
        let out = reconcile(&catalog, &moves);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].initial_quantity, 3);
        assert_eq!(out[0].current_quantity, 2.0);
    }

    #[test]
    fn unparsable_quantity_has_zero_impact() {
        let catalog = vec![row("MAT-1", "SITE-A", "PEP-1"); 2];
        let moves = vec![
            movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", "a lot"),
            movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", ""),
        ];
        let out = reconcile(&catalog, &moves);
        assert_eq!(out[0].current_quantity, 2.0);
    }

    #[test]
    fn reconcile_is_idempotent_and_order_stable() {
        let catalog = vec![
            row("MAT-2", "SITE-B", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-2"),
            row("MAT-1", "SITE-A", "PEP-1"),
        ];
        let moves = vec![movement(MovementKind::Inbound, "MAT-9", "SITE-C", "PEP-1", "1")];
        let first = reconcile(&catalog, &moves);
        let second = reconcile(&catalog, &moves);
        assert_eq!(first, second);

        let order: Vec<(&str, &str, &str)> = first
            .iter()
            .map(|r| {
                (
                    r.key.site_code.as_str(),
                    r.key.item_code.as_str(),
                    r.key.cost_element_code.as_str(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("SITE-A", "MAT-1", "PEP-1"),
                ("SITE-A", "MAT-1", "PEP-2"),
                ("SITE-B", "MAT-2", "PEP-1"),
                ("SITE-C", "MAT-9", "PEP-1"),
            ]
        );
    }

    #[test]
    fn no_row_with_non_positive_quantity_survives() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-2", "SITE-A", "PEP-1"),
        ];
        let moves = vec![
            movement(MovementKind::Outbound, "MAT-1", "SITE-A", "PEP-1", "1"),
            movement(MovementKind::Outbound, "MAT-2", "SITE-A", "PEP-1", "0.5"),
            movement(MovementKind::Outbound, "MAT-3", "SITE-A", "PEP-1", "7"),
        ];
        let out = reconcile(&catalog, &moves);
        assert!(out.iter().all(|r| r.current_quantity > 0.0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key.item_code, "MAT-2");
    }

    #[test]
    fn filter_is_case_and_whitespace_insensitive() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-2", "SITE-B", "PEP-1"),
        ];
        let rows = reconcile(&catalog, &[]);

        let filter = BalanceFilter {
            sites: vec![" site-b ".into()],
            ..Default::default()
        };
        let kept: Vec<_> = rows.iter().filter(|r| filter.matches(r)).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].key.site_code, "SITE-B");

        let unconstrained = BalanceFilter::default();
        assert!(rows.iter().all(|r| unconstrained.matches(r)));
    }

    #[test]
    fn summary_totals() {
        let catalog = vec![
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-1", "SITE-A", "PEP-1"),
            row("MAT-2", "SITE-B", "PEP-1"),
        ];
        let s = summarize(&reconcile(&catalog, &[]));
        assert_eq!(s.pieces, 3.0);
        assert_eq!(s.weight, 3.0 * 100.5);
    }
}
