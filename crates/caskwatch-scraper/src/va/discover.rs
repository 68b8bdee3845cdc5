//! Store-number discovery for the VA store list.

use std::ops::RangeInclusive;

use crate::error::ScraperError;
use crate::settings::{normalize_origin, SourceSettings};

use super::INVENTORY_PATH;

/// Store numbers scanned by default.
pub const DEFAULT_STORE_RANGE: RangeInclusive<u32> = 0..=499;
/// Any valid product code works; the endpoint only rejects unknown stores.
pub const DEFAULT_PROBE_CODE: &str = "018006";

/// Probes each candidate store number in order and returns the ones the
/// inventory endpoint answers with 200.
///
/// Requests are sequential and separated by `settings.base_delay`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for a malformed origin, or
/// [`ScraperError::Http`] if a request fails at the transport level.
pub async fn discover_stores(
    settings: &SourceSettings,
    origin: &str,
    candidates: RangeInclusive<u32>,
    probe_code: &str,
) -> Result<Vec<String>, ScraperError> {
    let origin = normalize_origin(origin)?;
    let client = settings.build_client()?;
    let url = format!("{origin}{INVENTORY_PATH}");
    let total = candidates.clone().count();
    let mut found = Vec::new();

    for (scanned, number) in candidates.enumerate() {
        if scanned > 0 && !settings.base_delay.is_zero() {
            tokio::time::sleep(settings.base_delay).await;
        }

        let store = number.to_string();
        let response = client
            .get(&url)
            .query(&[("storeNumbers", store.as_str()), ("productCodes", probe_code)])
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::REFERER, format!("{origin}/"))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::OK {
            tracing::info!(store = %store, found = found.len() + 1, "valid store");
            found.push(store);
        } else if scanned % 50 == 0 {
            tracing::info!(scanned = scanned + 1, total, found = found.len(), "scanning stores");
        }
    }

    Ok(found)
}
