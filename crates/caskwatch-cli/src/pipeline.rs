//! Poll, merge, and the full `caskwatch run` cycle.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use caskwatch_core::{merge_snapshot, save_snapshot, AppConfig, InventoryItem};
use caskwatch_scraper::InventorySource;

use crate::alert::{log_alerting_disabled, AlertPlan};
use crate::track::run_track;
use crate::RunArgs;

/// Result of one tracking pass.
#[derive(Debug)]
pub(crate) struct TrackOutcome {
    /// The snapshot as it was before this pass.
    pub(crate) previous: Vec<InventoryItem>,
    pub(crate) merged: Vec<InventoryItem>,
    /// Sources that failed outright; their jurisdictions were carried forward.
    pub(crate) failed_sources: Vec<String>,
}

/// Polls each source in turn and merges what came back into `existing`.
///
/// A source that fails completely is logged and leaves its jurisdiction
/// untouched; it never aborts the other sources.
pub(crate) async fn poll_and_merge(
    sources: &[Box<dyn InventorySource>],
    existing: Vec<InventoryItem>,
) -> TrackOutcome {
    let mut updates = Vec::with_capacity(sources.len());
    let mut failed_sources = Vec::new();

    for source in sources {
        tracing::info!(
            source = source.name(),
            stores = source.store_count(),
            products = source.product_codes().len(),
            "running source"
        );
        let started = Instant::now();

        match source.poll().await {
            Ok(report) => {
                tracing::info!(
                    source = source.name(),
                    items = report.items.len(),
                    skipped = report.skipped.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "source complete"
                );
                for skipped in &report.skipped {
                    tracing::debug!(
                        source = source.name(),
                        unit = %skipped.unit,
                        reason = %skipped.reason,
                        "unit skipped"
                    );
                }
                updates.push(report.into_update());
            }
            Err(e) => {
                tracing::error!(
                    source = source.name(),
                    error = %e,
                    "source failed; keeping its previous data"
                );
                failed_sources.push(source.name().to_owned());
            }
        }
    }

    let merged = merge_snapshot(existing.clone(), updates);
    TrackOutcome {
        previous: existing,
        merged,
        failed_sources,
    }
}

/// Polls, merges into `existing`, and writes the result to `output`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be written.
pub(crate) async fn poll_and_persist(
    sources: &[Box<dyn InventorySource>],
    existing: Vec<InventoryItem>,
    output: &Path,
) -> anyhow::Result<TrackOutcome> {
    let outcome = poll_and_merge(sources, existing).await;
    save_snapshot(output, &outcome.merged)
        .with_context(|| format!("failed to write snapshot {}", output.display()))?;
    Ok(outcome)
}

/// `caskwatch run`: validate alerting, track, persist, then alert on the
/// difference.
///
/// # Errors
///
/// Fails before anything is polled if the subscriber config or notifier is
/// invalid; afterwards if tracking or persistence fails, or any alert could
/// not be delivered.
pub(crate) async fn run_cycle(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let plan = AlertPlan::load(config, args.subscriptions.as_deref(), args.dry_run)?;
    let outcome = run_track(config, &args.track).await?;

    match plan {
        Some(plan) => plan
            .dispatch(&outcome.previous, &outcome.merged)
            .await
            .map(|_| ()),
        None => {
            log_alerting_disabled();
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
