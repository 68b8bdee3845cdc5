//! `caskwatch track`: poll sources, merge into the snapshot, persist.

use anyhow::Context;
use caskwatch_core::{load_snapshot, AppConfig, InventoryItem, Jurisdiction};
use caskwatch_scraper::{
    load_nc_catalog, load_store_list, load_va_products, products_needing_update, InventorySource,
    SourceSettings, VaAbcSource, WakeSource,
};
use chrono::Utc;

use crate::pipeline::{poll_and_persist, TrackOutcome};
use crate::TrackArgs;

/// Builds the sources enabled by `args`.
///
/// The Wake source only searches products whose stored data is stale, and is
/// left out entirely when nothing is.
pub(crate) fn build_sources(
    config: &AppConfig,
    args: &TrackArgs,
    existing: &[InventoryItem],
) -> anyhow::Result<Vec<Box<dyn InventorySource>>> {
    let settings = SourceSettings::from_app_config(config);
    let mut sources: Vec<Box<dyn InventorySource>> = Vec::new();

    if !args.no_va {
        let stores = load_store_list(&args.stores).context("failed to load VA store list")?;
        let products =
            load_va_products(&args.products).context("failed to load VA product map")?;
        sources.push(Box::new(VaAbcSource::new(stores, products, settings.clone())?));
    }

    if args.wake {
        let catalog = load_nc_catalog(&args.nc_products).context("failed to load NC catalog")?;
        let mut wake = WakeSource::new(catalog, settings)?;
        let codes = wake.product_codes();
        let stale =
            products_needing_update(&codes, existing, &Jurisdiction::wake_county(), Utc::now());
        tracing::info!(
            stale = stale.len(),
            total = codes.len(),
            "wake products needing update"
        );

        if stale.is_empty() {
            tracing::info!("all wake products are fresh; skipping source");
        } else {
            if stale.len() < codes.len() {
                wake.set_products_to_track(stale);
            }
            sources.push(Box::new(wake));
        }
    }

    Ok(sources)
}

/// Runs one tracking pass and writes the merged snapshot to `args.output`.
///
/// # Errors
///
/// Returns an error when no source is enabled, a catalog cannot be loaded,
/// or the snapshot cannot be written.
pub(crate) async fn run_track(
    config: &AppConfig,
    args: &TrackArgs,
) -> anyhow::Result<TrackOutcome> {
    if args.no_va && !args.wake {
        anyhow::bail!("no sources enabled; drop --no-va or pass --wake");
    }

    let existing = load_snapshot(&args.output);
    let sources = build_sources(config, args, &existing)?;
    let outcome = poll_and_persist(&sources, existing, &args.output).await?;

    println!(
        "Found {} items in stock across all sources; snapshot written to {}",
        outcome.merged.len(),
        args.output.display()
    );
    if !outcome.failed_sources.is_empty() {
        tracing::warn!(
            sources = %outcome.failed_sources.join(", "),
            "some sources failed; their previous data was kept"
        );
    }

    Ok(outcome)
}
