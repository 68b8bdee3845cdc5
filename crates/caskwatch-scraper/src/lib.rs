pub mod backoff;
pub mod catalog;
pub mod error;
pub(crate) mod html_text;
pub mod nc_stock;
pub(crate) mod pool;
pub mod settings;
pub mod source;
pub mod staleness;
pub mod va;
pub mod wake;

pub use backoff::{FailureAction, StoreBackoff};
pub use catalog::{
    load_nc_catalog, load_store_list, load_va_products, save_store_list, NcProduct,
};
pub use error::ScraperError;
pub use nc_stock::{
    fetch_nc_stock, listing_type_breakdown, parse_stock_table, save_nc_catalog, CatalogFilter,
    NC_ABC_ORIGIN,
};
pub use settings::SourceSettings;
pub use source::{InventorySource, PollReport, SkippedUnit};
pub use staleness::products_needing_update;
pub use va::discover::{discover_stores, DEFAULT_PROBE_CODE, DEFAULT_STORE_RANGE};
pub use va::{VaAbcSource, VA_ABC_ORIGIN};
pub use wake::{GeoLookup, WakeSource, WakeStoreDirectory, WAKE_ABC_ORIGIN};
