//! NC ABC warehouse stock list: the source of the Wake County catalog.
//!
//! The stock page is one large HTML table. Each body row carries, in order:
//! NC code, brand name, listing type, cases available, size, (unused), and
//! supplier.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::NcProduct;
use crate::error::ScraperError;
use crate::html_text::inner_text;
use crate::settings::{normalize_origin, SourceSettings};

pub const NC_ABC_ORIGIN: &str = "https://abc2.nc.gov";
const STOCK_PATH: &str = "/StoresBoards/Stocks";
const MIN_COLUMNS: usize = 7;

static TBODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody>").expect("valid regex"));
static TR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid regex"));
static TD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("valid regex"));

/// Narrows a fetched catalog before it is written out.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive listing type, e.g. `Allocation`.
    pub listing_type: Option<String>,
    pub min_cases: i64,
}

impl CatalogFilter {
    #[must_use]
    pub fn accepts(&self, product: &NcProduct) -> bool {
        let type_ok = self
            .listing_type
            .as_deref()
            .is_none_or(|wanted| product.listing_type.eq_ignore_ascii_case(wanted));
        type_ok && product.available >= self.min_cases
    }

    #[must_use]
    pub fn apply(&self, products: Vec<NcProduct>) -> Vec<NcProduct> {
        products.into_iter().filter(|p| self.accepts(p)).collect()
    }
}

/// Parses every complete row of the stock table.
///
/// Rows with fewer than seven cells, or without a code or brand name, are
/// skipped. An unparseable case count reads as zero.
#[must_use]
pub fn parse_stock_table(html: &str) -> Vec<NcProduct> {
    TBODY_RE
        .captures_iter(html)
        .flat_map(|body| {
            TR_RE
                .captures_iter(body.get(1).map_or("", |m| m.as_str()))
                .filter_map(|row| parse_row(&row[1]))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn parse_row(row: &str) -> Option<NcProduct> {
    let cells: Vec<String> = TD_RE
        .captures_iter(row)
        .map(|cell| inner_text(&cell[1]))
        .collect();
    if cells.len() < MIN_COLUMNS {
        return None;
    }

    let nc_code = cells[0].clone();
    let brand_name = cells[1].clone();
    if nc_code.is_empty() || brand_name.is_empty() {
        return None;
    }

    let supplier = cells[6].clone();
    Some(NcProduct {
        nc_code,
        brand_name,
        listing_type: cells[2].clone(),
        size: cells[4].clone(),
        available: cells[3].replace(',', "").parse().unwrap_or(0),
        supplier: (!supplier.is_empty()).then_some(supplier),
    })
}

/// Counts products per listing type, for the post-sync summary.
#[must_use]
pub fn listing_type_breakdown(products: &[NcProduct]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for product in products {
        *counts.entry(product.listing_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Downloads and parses the warehouse stock list.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for a malformed origin,
/// [`ScraperError::Http`] on transport failure, or
/// [`ScraperError::UnexpectedStatus`] for any status other than 200.
pub async fn fetch_nc_stock(
    settings: &SourceSettings,
    origin: &str,
) -> Result<Vec<NcProduct>, ScraperError> {
    let url = format!("{}{STOCK_PATH}", normalize_origin(origin)?);
    let client = settings.build_client()?;

    tracing::info!(url = %url, "fetching NC warehouse stock list");
    let response = client.get(&url).send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }

    let products = parse_stock_table(&response.text().await?);
    tracing::info!(count = products.len(), "parsed NC warehouse stock list");
    Ok(products)
}

/// Writes a catalog as pretty JSON, the format [`crate::load_nc_catalog`] reads.
///
/// # Errors
///
/// Returns [`ScraperError::Catalog`] if the file cannot be written.
pub fn save_nc_catalog(path: &Path, products: &[NcProduct]) -> Result<(), ScraperError> {
    let catalog_err = |reason: String| ScraperError::Catalog {
        path: path.display().to_string(),
        reason,
    };
    let body = serde_json::to_string_pretty(products).map_err(|e| catalog_err(e.to_string()))?;
    std::fs::write(path, body).map_err(|e| catalog_err(e.to_string()))
}
