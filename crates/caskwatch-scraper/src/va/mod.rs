//! Virginia ABC source: one request per store, strictly sequential.
//!
//! The upstream endpoint throttles aggressively, so stores are polled one at
//! a time with a fixed delay between requests and an adaptive backoff on
//! non-success responses (see [`crate::backoff`]).

pub mod discover;
mod response;

use std::collections::BTreeMap;

use async_trait::async_trait;
use caskwatch_core::{Jurisdiction, RefreshScope};
use chrono::Utc;
use reqwest::Client;

use crate::backoff::{FailureAction, StoreBackoff};
use crate::error::ScraperError;
use crate::settings::{normalize_origin, SourceSettings};
use crate::source::{InventorySource, PollReport, SkippedUnit};
use response::StoreInventoryResponse;

pub const VA_ABC_ORIGIN: &str = "https://www.abc.virginia.gov";
pub(crate) const INVENTORY_PATH: &str = "/webapi/inventory/mystore";

pub struct VaAbcSource {
    client: Client,
    settings: SourceSettings,
    origin: String,
    stores: Vec<String>,
    products: BTreeMap<String, String>,
}

impl VaAbcSource {
    /// Creates a source polling `stores` for every code in `products`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        stores: Vec<String>,
        products: BTreeMap<String, String>,
        settings: SourceSettings,
    ) -> Result<Self, ScraperError> {
        Self::with_origin(stores, products, settings, VA_ABC_ORIGIN)
    }

    /// Like [`Self::new`] but against a different site origin.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for a malformed origin, or
    /// [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn with_origin(
        stores: Vec<String>,
        products: BTreeMap<String, String>,
        settings: SourceSettings,
        origin: &str,
    ) -> Result<Self, ScraperError> {
        let origin = normalize_origin(origin)?;
        let client = settings.build_client()?;
        Ok(Self {
            client,
            settings,
            origin,
            stores,
            products,
        })
    }

    fn product_list(&self) -> String {
        self.products.keys().cloned().collect::<Vec<_>>().join(",")
    }

    async fn fetch_store(&self, store: &str, product_list: &str) -> Result<String, ScraperError> {
        let url = format!("{}{INVENTORY_PATH}", self.origin);
        let response = self
            .client
            .get(&url)
            .query(&[("storeNumbers", store), ("productCodes", product_list)])
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::REFERER, format!("{}/", self.origin))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl InventorySource for VaAbcSource {
    fn name(&self) -> &str {
        "VA ABC"
    }

    fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction::virginia()
    }

    fn store_count(&self) -> usize {
        self.stores.len()
    }

    fn product_codes(&self) -> Vec<String> {
        self.products.keys().cloned().collect()
    }

    async fn poll(&self) -> Result<PollReport, ScraperError> {
        let product_list = self.product_list();
        let mut backoff =
            StoreBackoff::new(self.settings.max_retries, self.settings.backoff_ceiling);
        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let mut idx = 0usize;
        let mut first_request = true;

        while let Some(store) = self.stores.get(idx) {
            if !first_request && !self.settings.base_delay.is_zero() {
                tokio::time::sleep(self.settings.base_delay).await;
            }
            first_request = false;

            let body = match self.fetch_store(store, &product_list).await {
                Ok(body) => body,
                Err(e) if !e.is_transient() => {
                    tracing::warn!(store = %store, error = %e, "skipping store");
                    skipped.push(SkippedUnit {
                        unit: store.clone(),
                        reason: e.to_string(),
                    });
                    idx += 1;
                    continue;
                }
                Err(e) => {
                    match backoff.record_failure(store) {
                        FailureAction::Retry { wait } => {
                            tracing::warn!(
                                store = %store,
                                attempt = backoff.attempts(store),
                                wait,
                                error = %e,
                                "store request failed; backing off"
                            );
                            let delay = self
                                .settings
                                .backoff_unit
                                .saturating_mul(u32::try_from(wait).unwrap_or(u32::MAX));
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        FailureAction::Abandon { attempts } => {
                            tracing::warn!(
                                store = %store,
                                attempts,
                                error = %e,
                                "abandoning store for this run"
                            );
                            skipped.push(SkippedUnit {
                                unit: store.clone(),
                                reason: format!("abandoned after {attempts} attempts: {e}"),
                            });
                            idx += 1;
                        }
                    }
                    continue;
                }
            };

            backoff.record_success();
            idx += 1;

            match serde_json::from_str::<StoreInventoryResponse>(&body) {
                Ok(parsed) => {
                    let store_items =
                        parsed.into_items(store, &self.products, &self.origin, Utc::now());
                    tracing::debug!(store = %store, count = store_items.len(), "store polled");
                    items.extend(store_items);
                }
                Err(source) => {
                    let err = ScraperError::Deserialize {
                        context: format!("inventory for store {store}"),
                        source,
                    };
                    tracing::warn!(
                        store = %store,
                        error = %err,
                        "skipping unparseable store response"
                    );
                    skipped.push(SkippedUnit {
                        unit: store.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !self.stores.is_empty() && skipped.len() == self.stores.len() {
            return Err(ScraperError::AllUnitsFailed {
                source_name: self.name().to_owned(),
                units: skipped.len(),
            });
        }

        Ok(PollReport {
            jurisdiction: self.jurisdiction(),
            scope: RefreshScope::Jurisdiction,
            items,
            skipped,
        })
    }
}
