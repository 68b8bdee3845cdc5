//! Catalog refresh commands: `discover-stores` and `nc-catalog`.

use anyhow::Context;
use caskwatch_core::AppConfig;
use caskwatch_scraper::{
    discover_stores, fetch_nc_stock, listing_type_breakdown, save_nc_catalog, save_store_list,
    CatalogFilter, SourceSettings, DEFAULT_PROBE_CODE, NC_ABC_ORIGIN, VA_ABC_ORIGIN,
};

use crate::{DiscoverStoresArgs, NcCatalogArgs};

pub(crate) async fn run_discover_stores(
    config: &AppConfig,
    args: &DiscoverStoresArgs,
) -> anyhow::Result<()> {
    if args.first > args.last {
        anyhow::bail!("--first ({}) must not exceed --last ({})", args.first, args.last);
    }

    let settings = SourceSettings::from_app_config(config);
    println!(
        "Scanning Virginia ABC store numbers {}-{}...",
        args.first, args.last
    );
    let stores = discover_stores(
        &settings,
        VA_ABC_ORIGIN,
        args.first..=args.last,
        DEFAULT_PROBE_CODE,
    )
    .await
    .context("store discovery failed")?;

    save_store_list(&args.output, &stores)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "Found {} valid stores; wrote {}",
        stores.len(),
        args.output.display()
    );
    Ok(())
}

pub(crate) async fn run_nc_catalog(
    config: &AppConfig,
    args: &NcCatalogArgs,
) -> anyhow::Result<()> {
    let settings = SourceSettings::from_app_config(config);
    let products = fetch_nc_stock(&settings, NC_ABC_ORIGIN)
        .await
        .context("failed to fetch NC warehouse stock")?;
    let total = products.len();

    let filter = CatalogFilter {
        listing_type: args.listing.clone(),
        min_cases: args.min_cases,
    };
    let kept = filter.apply(products);
    save_nc_catalog(&args.output, &kept)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} products (filtered from {total}) to {}",
        kept.len(),
        args.output.display()
    );
    println!("Breakdown by listing type:");
    for (listing_type, count) in listing_type_breakdown(&kept) {
        println!("  {listing_type}: {count}");
    }
    Ok(())
}
