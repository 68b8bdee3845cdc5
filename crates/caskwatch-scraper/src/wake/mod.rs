//! Wake County (NC) ABC source: one search per product, fanned out over a
//! bounded worker pool.

mod parse;
mod stores;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use caskwatch_core::{
    normalize_product_name, InventoryItem, Jurisdiction, Location, RefreshScope, NC, WAKE,
    WAKE_PREFIX,
};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};

use crate::catalog::NcProduct;
use crate::error::ScraperError;
use crate::pool::run_bounded;
use crate::settings::{normalize_origin, SourceSettings};
use crate::source::{InventorySource, PollReport, SkippedUnit};

pub use stores::WakeStoreDirectory;

pub const WAKE_ABC_ORIGIN: &str = "https://wakeabc.com";
/// Stores operated by the Wake County ABC board.
pub const WAKE_STORE_COUNT: usize = 15;

/// Resolves a rendered store address to coordinates.
pub trait GeoLookup: Send + Sync {
    fn locate(&self, address: &str) -> Option<Location>;
}

pub struct WakeSource {
    search: Arc<ProductSearch>,
    settings: SourceSettings,
    catalog: BTreeMap<String, NcProduct>,
    /// `None` searches the whole catalog.
    products_to_track: Option<HashSet<String>>,
}

impl WakeSource {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(catalog: Vec<NcProduct>, settings: SourceSettings) -> Result<Self, ScraperError> {
        Self::with_origin(catalog, settings, WAKE_ABC_ORIGIN)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for a malformed origin, or
    /// [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn with_origin(
        catalog: Vec<NcProduct>,
        settings: SourceSettings,
        origin: &str,
    ) -> Result<Self, ScraperError> {
        let search = ProductSearch {
            client: settings.build_client()?,
            origin: normalize_origin(origin)?,
            geo: Arc::new(WakeStoreDirectory),
        };
        Ok(Self {
            search: Arc::new(search),
            settings,
            catalog: catalog
                .into_iter()
                .map(|p| (p.nc_code.clone(), p))
                .collect(),
            products_to_track: None,
        })
    }

    /// Replaces the address lookup used to place stores on the map.
    #[must_use]
    pub fn with_geo_lookup(mut self, geo: Arc<dyn GeoLookup>) -> Self {
        let search = ProductSearch {
            client: self.search.client.clone(),
            origin: self.search.origin.clone(),
            geo,
        };
        self.search = Arc::new(search);
        self
    }

    /// Restricts the next polls to `codes`. An empty list means every product.
    pub fn set_products_to_track<I>(&mut self, codes: I)
    where
        I: IntoIterator<Item = String>,
    {
        let codes: HashSet<String> = codes.into_iter().collect();
        self.products_to_track = if codes.is_empty() { None } else { Some(codes) };
    }

    fn targets(&self) -> Vec<NcProduct> {
        self.catalog
            .values()
            .filter(|p| {
                self.products_to_track
                    .as_ref()
                    .is_none_or(|subset| subset.contains(&p.nc_code))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InventorySource for WakeSource {
    fn name(&self) -> &str {
        "NC Wake County ABC"
    }

    fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction::wake_county()
    }

    fn store_count(&self) -> usize {
        WAKE_STORE_COUNT
    }

    fn product_codes(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }

    async fn poll(&self) -> Result<PollReport, ScraperError> {
        let targets = self.targets();
        if targets.is_empty() {
            tracing::info!(source = self.name(), "no products need updating");
            return Ok(PollReport {
                jurisdiction: self.jurisdiction(),
                scope: RefreshScope::Products(HashSet::new()),
                items: Vec::new(),
                skipped: Vec::new(),
            });
        }

        tracing::info!(
            source = self.name(),
            searching = targets.len(),
            catalog = self.catalog.len(),
            "searching products"
        );

        let dispatched: Vec<String> = targets.iter().map(|p| p.nc_code.clone()).collect();
        let search = Arc::clone(&self.search);
        let results = run_bounded(
            targets,
            self.settings.max_concurrent,
            self.settings.task_delay,
            move |product: NcProduct| {
                let search = Arc::clone(&search);
                async move {
                    let outcome = search.run(&product).await;
                    (product, outcome)
                }
            },
        )
        .await;

        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let mut refreshed = HashSet::new();

        for (product, outcome) in results {
            match outcome {
                Ok(found) => {
                    if !found.is_empty() {
                        tracing::debug!(
                            product = %product.nc_code,
                            name = %product.brand_name,
                            count = found.len(),
                            "found stock"
                        );
                    }
                    items.extend(found);
                    refreshed.insert(product.nc_code);
                }
                Err(e) => {
                    tracing::warn!(product = %product.nc_code, error = %e, "product search failed");
                    skipped.push(SkippedUnit {
                        unit: product.nc_code,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for code in &dispatched {
            let reported = refreshed.contains(code) || skipped.iter().any(|s| &s.unit == code);
            if !reported {
                skipped.push(SkippedUnit {
                    unit: code.clone(),
                    reason: ScraperError::TaskLost(code.clone()).to_string(),
                });
            }
        }

        if refreshed.is_empty() {
            return Err(ScraperError::AllUnitsFailed {
                source_name: self.name().to_owned(),
                units: dispatched.len(),
            });
        }

        let scope = if self.products_to_track.is_none() && skipped.is_empty() {
            RefreshScope::Jurisdiction
        } else {
            RefreshScope::Products(refreshed)
        };

        Ok(PollReport {
            jurisdiction: self.jurisdiction(),
            scope,
            items,
            skipped,
        })
    }
}

/// Everything a search task needs, shared across the pool.
struct ProductSearch {
    client: Client,
    origin: String,
    geo: Arc<dyn GeoLookup>,
}

impl ProductSearch {
    async fn run(&self, product: &NcProduct) -> Result<Vec<InventoryItem>, ScraperError> {
        let url = format!("{}/search-results", self.origin);
        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::REFERER,
                format!("{}/search-our-inventory/", self.origin),
            )
            .form(&[("productSearch", product.nc_code.as_str())])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ScraperError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        self.to_items(product, &body, Utc::now())
    }

    fn store_page(&self, code: &str) -> Result<String, ScraperError> {
        let base = format!("{}/search-our-inventory/", self.origin);
        Url::parse_with_params(&base, &[("productSearch", code)])
            .map(String::from)
            .map_err(|e| ScraperError::InvalidUrl {
                url: base,
                reason: e.to_string(),
            })
    }

    fn to_items(
        &self,
        product: &NcProduct,
        html: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<Vec<InventoryItem>, ScraperError> {
        let store_url = self.store_page(&product.nc_code)?;
        let mut items = Vec::new();

        // Searches are by exact NC code, so every block on the page is taken
        // to be `product`; the page carries no code of its own per block.
        for listing in parse::parse_search_results(html) {
            if listing.out_of_stock {
                continue;
            }
            let raw_name = if listing.name.is_empty() {
                &product.brand_name
            } else {
                &listing.name
            };
            let product_name = normalize_product_name(raw_name);

            for stock in listing.stores.into_iter().filter(|s| s.quantity > 0) {
                let location = self.geo.locate(&stock.address).unwrap_or_else(|| {
                    tracing::warn!(address = %stock.address, "no coordinates for store address");
                    Location::default()
                });
                items.push(InventoryItem {
                    timestamp: observed_at,
                    product_name: product_name.clone(),
                    product_id: format!("{WAKE_PREFIX}{}", product.nc_code),
                    location,
                    quantity: stock.quantity,
                    store_id: format!("{WAKE_PREFIX}{}", parse::slugify_street(&stock.address)),
                    store_url: store_url.clone(),
                    state: NC.to_owned(),
                    county: WAKE.to_owned(),
                    listing_type: product.listing_type.clone(),
                });
            }
        }

        Ok(items)
    }
}
