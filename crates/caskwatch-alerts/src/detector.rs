//! Snapshot diffing keyed by `(product_id, store_id)`.

use std::collections::BTreeMap;

use caskwatch_core::InventoryItem;

/// Quantity movement of a listing present in both snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityChange {
    /// The listing as observed in the current snapshot.
    pub item: InventoryItem,
    pub old_quantity: u32,
    pub new_quantity: u32,
    /// `new_quantity - old_quantity`.
    pub delta: i64,
}

/// Everything that differs between two snapshots.
///
/// Each list is ordered by identity key, so the result is deterministic for
/// a given input pair regardless of the order items were polled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub new_items: Vec<InventoryItem>,
    pub removed_items: Vec<InventoryItem>,
    pub quantity_changes: Vec<QuantityChange>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_items.is_empty()
            && self.removed_items.is_empty()
            && self.quantity_changes.is_empty()
    }
}

fn index(items: &[InventoryItem]) -> BTreeMap<(&str, &str), &InventoryItem> {
    items.iter().map(|item| (item.key(), item)).collect()
}

/// Compares `previous` against `current`.
///
/// A key present only in `current` is new, a key present only in `previous`
/// is removed, and a key in both with a different quantity is a quantity
/// change. When a snapshot repeats a key, its last occurrence wins.
#[must_use]
pub fn detect(previous: &[InventoryItem], current: &[InventoryItem]) -> ChangeSet {
    let before = index(previous);
    let after = index(current);
    let mut changes = ChangeSet::default();

    for (key, &item) in &after {
        match before.get(key) {
            None => changes.new_items.push(item.clone()),
            Some(&old) if old.quantity != item.quantity => {
                changes.quantity_changes.push(QuantityChange {
                    item: item.clone(),
                    old_quantity: old.quantity,
                    new_quantity: item.quantity,
                    delta: i64::from(item.quantity) - i64::from(old.quantity),
                });
            }
            Some(_) => {}
        }
    }

    changes.removed_items = before
        .iter()
        .filter(|(key, _)| !after.contains_key(*key))
        .map(|(_, &item)| item.clone())
        .collect();

    changes
}

#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;
