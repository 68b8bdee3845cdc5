//! Canonical inventory record shared by every source.
//!
//! The serialized field names are the persisted snapshot format and must not
//! change without a migration of existing snapshot files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State code for the Virginia ABC source.
pub const VA: &str = "VA";
/// State code for North Carolina sources.
pub const NC: &str = "NC";
/// County name for the Wake County ABC source.
pub const WAKE: &str = "Wake";
/// Prefix applied to Wake County product and store identifiers so they never
/// collide with Virginia's raw numeric codes.
pub const WAKE_PREFIX: &str = "wake-";
/// Listing type of standard shelf products; these refresh on a slow cadence.
pub const LISTED: &str = "Listed";

/// Geographic coordinate of a store. `(0.0, 0.0)` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Location {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` unless this is the zero-value placeholder.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

/// One product observed in stock at one store.
///
/// Items are created fresh on every poll and never mutated afterwards. A
/// source never materializes an item with zero quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "bt.productName")]
    pub product_name: String,
    #[serde(rename = "bt.productId")]
    pub product_id: String,
    #[serde(rename = "geo.location", default)]
    pub location: Location,
    #[serde(rename = "bt.quantity")]
    pub quantity: u32,
    #[serde(rename = "bt.storeId")]
    pub store_id: String,
    #[serde(rename = "bt.storeurl", default)]
    pub store_url: String,
    #[serde(rename = "bt.state")]
    pub state: String,
    /// Empty for jurisdictions that are not county-scoped.
    #[serde(rename = "bt.county", default)]
    pub county: String,
    /// Only populated by sources that expose a listing classification.
    #[serde(
        rename = "bt.listingType",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub listing_type: String,
}

impl InventoryItem {
    /// Identity key of this listing within its jurisdiction snapshot.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.product_id, &self.store_id)
    }

    #[must_use]
    pub fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction::new(&self.state, &self.county)
    }

    /// The source's own product code, without any disambiguation prefix.
    #[must_use]
    pub fn product_code(&self) -> &str {
        self.product_id
            .strip_prefix(WAKE_PREFIX)
            .unwrap_or(&self.product_id)
    }
}

/// A state or county scoped inventory source boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Jurisdiction {
    pub state: String,
    pub county: String,
}

impl Jurisdiction {
    #[must_use]
    pub fn new(state: &str, county: &str) -> Self {
        Self {
            state: state.to_owned(),
            county: county.to_owned(),
        }
    }

    #[must_use]
    pub fn virginia() -> Self {
        Self::new(VA, "")
    }

    #[must_use]
    pub fn wake_county() -> Self {
        Self::new(NC, WAKE)
    }

    /// Whether items from this jurisdiction carry a listing type.
    #[must_use]
    pub fn models_listing_type(&self) -> bool {
        self.state == NC
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.county.is_empty() {
            write!(f, "{}", self.state)
        } else {
            write!(f, "{} {}", self.state, self.county)
        }
    }
}
