//! Which products a partial-refresh source should poll this run.

use std::collections::HashMap;

use caskwatch_core::{InventoryItem, Jurisdiction, LISTED};
use chrono::{DateTime, Duration, Utc};

/// Standard shelf products change slowly.
const LISTED_MAX_AGE: Duration = Duration::hours(24);
/// Allocated, limited and seasonal products can sell out within the hour.
const SCARCE_MAX_AGE: Duration = Duration::hours(1);

/// Returns the subset of `codes` whose stored data is stale at `now`.
///
/// Only records of `jurisdiction` are considered. A code with no record is
/// always stale. Otherwise the newest record decides: `Listed` products are
/// stale after 24 hours, everything else after one hour. Output preserves
/// the order of `codes`.
#[must_use]
pub fn products_needing_update(
    codes: &[String],
    existing: &[InventoryItem],
    jurisdiction: &Jurisdiction,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut latest: HashMap<&str, &InventoryItem> = HashMap::new();
    for item in existing
        .iter()
        .filter(|item| item.jurisdiction() == *jurisdiction)
    {
        latest
            .entry(item.product_code())
            .and_modify(|seen| {
                if item.timestamp > seen.timestamp {
                    *seen = item;
                }
            })
            .or_insert(item);
    }

    codes
        .iter()
        .filter(|code| {
            latest.get(code.as_str()).is_none_or(|record| {
                let max_age = if record.listing_type == LISTED {
                    LISTED_MAX_AGE
                } else {
                    SCARCE_MAX_AGE
                };
                now - record.timestamp > max_age
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use caskwatch_core::Location;

    fn wake_item(code: &str, listing_type: &str, age: Duration, now: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            timestamp: now - age,
            product_name: format!("Product {code}"),
            product_id: format!("wake-{code}"),
            location: Location::default(),
            quantity: 1,
            store_id: "wake-1-main-st".to_owned(),
            store_url: String::new(),
            state: "NC".to_owned(),
            county: "Wake".to_owned(),
            listing_type: listing_type.to_owned(),
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn missing_records_are_stale() {
        let now = Utc::now();
        let stale = products_needing_update(
            &codes(&["00123", "00456"]),
            &[],
            &Jurisdiction::wake_county(),
            now,
        );
        assert_eq!(stale, codes(&["00123", "00456"]));
    }

    #[test]
    fn listed_products_refresh_daily() {
        let now = Utc::now();
        let existing = vec![
            wake_item("fresh", "Listed", Duration::hours(2), now),
            wake_item("old", "Listed", Duration::hours(25), now),
        ];
        let stale = products_needing_update(
            &codes(&["fresh", "old"]),
            &existing,
            &Jurisdiction::wake_county(),
            now,
        );
        assert_eq!(stale, codes(&["old"]));
    }

    #[test]
    fn scarce_products_refresh_hourly() {
        let now = Utc::now();
        let existing = vec![
            wake_item("a", "Allocation", Duration::minutes(30), now),
            wake_item("b", "Limited", Duration::minutes(90), now),
            wake_item("c", "", Duration::minutes(61), now),
        ];
        let stale = products_needing_update(
            &codes(&["a", "b", "c"]),
            &existing,
            &Jurisdiction::wake_county(),
            now,
        );
        assert_eq!(stale, codes(&["b", "c"]));
    }

    #[test]
    fn newest_record_decides() {
        let now = Utc::now();
        let existing = vec![
            wake_item("a", "Allocation", Duration::hours(5), now),
            wake_item("a", "Allocation", Duration::minutes(10), now),
        ];
        let stale = products_needing_update(
            &codes(&["a"]),
            &existing,
            &Jurisdiction::wake_county(),
            now,
        );
        assert!(stale.is_empty());
    }

    #[test]
    fn other_jurisdictions_are_ignored() {
        let now = Utc::now();
        let mut va = wake_item("018006", "", Duration::minutes(1), now);
        va.product_id = "018006".to_owned();
        va.state = "VA".to_owned();
        va.county = String::new();

        let stale = products_needing_update(
            &codes(&["018006"]),
            &[va],
            &Jurisdiction::wake_county(),
            now,
        );
        assert_eq!(stale, codes(&["018006"]));
    }

    #[test]
    fn exactly_at_threshold_is_fresh() {
        let now = Utc::now();
        let existing = vec![wake_item("a", "Listed", Duration::hours(24), now)];
        let stale = products_needing_update(
            &codes(&["a"]),
            &existing,
            &Jurisdiction::wake_county(),
            now,
        );
        assert!(stale.is_empty());
    }
}
