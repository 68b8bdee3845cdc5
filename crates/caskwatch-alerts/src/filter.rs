//! Subscriber preference matching.
//!
//! Every dimension is an allow-list; an empty list accepts everything. The
//! dimensions combine with AND.

use caskwatch_core::{normalize_product_name, InventoryItem, Preferences, WAKE_PREFIX};

/// Matches any product name.
const WILDCARD: &str = "*";

fn allows(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v == value)
}

/// Listing types are only checked for jurisdictions that publish them; a
/// Virginia item cannot be excluded on a dimension it never carries.
fn allows_listing_type(item: &InventoryItem, prefs: &Preferences) -> bool {
    if prefs.listing_types.is_empty() || !item.jurisdiction().models_listing_type() {
        return true;
    }
    !item.listing_type.is_empty() && prefs.listing_types.contains(&item.listing_type)
}

fn allows_product_name(name: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let name = normalize_product_name(name).to_lowercase();
    filters.iter().any(|filter| {
        filter == WILDCARD || name.contains(&normalize_product_name(filter).to_lowercase())
    })
}

fn unprefixed(id: &str) -> &str {
    id.strip_prefix(WAKE_PREFIX).unwrap_or(id)
}

/// `"018006"` and `"wake-018006"` match each other in either direction.
fn allows_product_id(id: &str, filters: &[String]) -> bool {
    filters.is_empty()
        || filters
            .iter()
            .any(|filter| filter == id || unprefixed(filter) == unprefixed(id))
}

/// Whether `item` satisfies every dimension of `prefs`.
#[must_use]
pub fn matches(item: &InventoryItem, prefs: &Preferences) -> bool {
    allows(&prefs.states, &item.state)
        && allows(&prefs.counties, &item.county)
        && allows_listing_type(item, prefs)
        && allows_product_name(&item.product_name, &prefs.products)
        && allows_product_id(&item.product_id, &prefs.product_ids)
        && i64::from(item.quantity) >= prefs.min_quantity
}

/// The items matching `prefs`, in input order.
#[must_use]
pub fn filter_for_subscriber(items: &[InventoryItem], prefs: &Preferences) -> Vec<InventoryItem> {
    items
        .iter()
        .filter(|item| matches(item, prefs))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
