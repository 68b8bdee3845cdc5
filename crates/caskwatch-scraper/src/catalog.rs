//! Static catalogs the sources poll against: store numbers and product codes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// A product from the NC ABC warehouse stock list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NcProduct {
    pub nc_code: String,
    pub brand_name: String,
    #[serde(default)]
    pub listing_type: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "total_available", default)]
    pub available: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

fn read(path: &Path) -> Result<String, ScraperError> {
    std::fs::read_to_string(path).map_err(|e| ScraperError::Catalog {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Reads a newline-delimited list of store numbers, ignoring blank lines.
///
/// # Errors
///
/// Returns [`ScraperError::Catalog`] if the file cannot be read.
pub fn load_store_list(path: &Path) -> Result<Vec<String>, ScraperError> {
    Ok(read(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Writes store numbers one per line, replacing any existing file.
///
/// # Errors
///
/// Returns [`ScraperError::Catalog`] if the file cannot be written.
pub fn save_store_list(path: &Path, stores: &[String]) -> Result<(), ScraperError> {
    let mut body = stores.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    std::fs::write(path, body).map_err(|e| ScraperError::Catalog {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Reads the VA product map, a JSON object of `code -> name`.
///
/// # Errors
///
/// Returns [`ScraperError::Catalog`] if the file cannot be read or parsed.
pub fn load_va_products(path: &Path) -> Result<BTreeMap<String, String>, ScraperError> {
    serde_json::from_str(&read(path)?).map_err(|e| ScraperError::Catalog {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Reads the NC catalog, a JSON array of [`NcProduct`].
///
/// # Errors
///
/// Returns [`ScraperError::Catalog`] if the file cannot be read or parsed.
pub fn load_nc_catalog(path: &Path) -> Result<Vec<NcProduct>, ScraperError> {
    serde_json::from_str(&read(path)?).map_err(|e| ScraperError::Catalog {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "caskwatch-catalog-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn store_list_skips_blank_lines() {
        let path = write_temp("stores", "100\n\n 416 \n217\n");
        assert_eq!(load_store_list(&path).unwrap(), vec!["100", "416", "217"]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn saved_store_list_loads_back() {
        let path = write_temp("saved-stores", "");
        let stores = vec!["3".to_owned(), "416".to_owned()];
        save_store_list(&path, &stores).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3\n416\n");
        assert_eq!(load_store_list(&path).unwrap(), stores);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn va_products_parse_as_sorted_map() {
        let path = write_temp(
            "products.json",
            r#"{"018006": "Buffalo Trace", "017766": "Eagle Rare 10 Year"}"#,
        );
        let products = load_va_products(&path).unwrap();
        let codes: Vec<&String> = products.keys().collect();
        assert_eq!(codes, vec!["017766", "018006"]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn nc_catalog_tolerates_missing_optional_fields() {
        let path = write_temp(
            "nc-products.json",
            r#"[{"nc_code": "00123", "brand_name": "Blanton's", "listing_type": "Allocation"}]"#,
        );
        let catalog = load_nc_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].listing_type, "Allocation");
        assert_eq!(catalog[0].available, 0);
        assert!(catalog[0].supplier.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let path = write_temp("bad.json", "[{");
        assert!(matches!(
            load_nc_catalog(&path),
            Err(ScraperError::Catalog { .. })
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_store_list_is_an_error() {
        let path = std::env::temp_dir().join("caskwatch-no-such-stores");
        assert!(load_store_list(&path).is_err());
    }
}
