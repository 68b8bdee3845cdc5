//! Virginia ABC `mystore` inventory response.

use std::collections::BTreeMap;

use caskwatch_core::{normalize_product_name, InventoryItem, Location, VA};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct StoreInventoryResponse {
    #[serde(default)]
    pub products: Vec<ProductStock>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductStock {
    pub product_id: String,
    pub store_info: StoreInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoreInfo {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub quantity: i64,
}

impl StoreInventoryResponse {
    /// Converts the response into canonical items, dropping zero stock.
    pub(crate) fn into_items(
        self,
        store: &str,
        products: &BTreeMap<String, String>,
        site_origin: &str,
        observed_at: DateTime<Utc>,
    ) -> Vec<InventoryItem> {
        let store_url = format!(
            "{}/{}",
            site_origin.trim_end_matches('/'),
            self.url.trim_start_matches('/')
        );

        self.products
            .into_iter()
            .filter_map(|p| {
                let quantity = u32::try_from(p.store_info.quantity).ok().filter(|&q| q > 0)?;
                let name = products.get(&p.product_id).map_or("", String::as_str);
                Some(InventoryItem {
                    timestamp: observed_at,
                    product_name: normalize_product_name(name),
                    location: Location::new(p.store_info.latitude, p.store_info.longitude),
                    product_id: p.product_id,
                    quantity,
                    store_id: store.to_owned(),
                    store_url: store_url.clone(),
                    state: VA.to_owned(),
                    county: String::new(),
                    listing_type: String::new(),
                })
            })
            .collect()
    }
}
