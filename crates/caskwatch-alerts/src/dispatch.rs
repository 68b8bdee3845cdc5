//! Turns a snapshot diff into per-subscriber alerts.

use std::collections::BTreeMap;

use caskwatch_core::{InventoryItem, Subscriber};

use crate::detector::{detect, ChangeSet};
use crate::filter::filter_for_subscriber;
use crate::notifier::{BatchReport, Notifier};

/// What an alert pass decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No baseline existed, so every item looked new; nothing was sent.
    FirstRun,
    /// No enabled subscriber matched any new item.
    NoMatches,
    Dispatched(BatchReport),
}

impl DispatchOutcome {
    /// Subscribers whose alert could not be delivered.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            DispatchOutcome::Dispatched(report) => report.failure_count(),
            DispatchOutcome::FirstRun | DispatchOutcome::NoMatches => 0,
        }
    }
}

/// Maps each enabled subscriber with at least one match to its matching
/// items. Subscribers without matches are absent.
#[must_use]
pub fn match_subscribers(
    new_items: &[InventoryItem],
    subscribers: &[Subscriber],
) -> BTreeMap<String, Vec<InventoryItem>> {
    subscribers
        .iter()
        .filter(|sub| sub.enabled)
        .filter_map(|sub| {
            let matched = filter_for_subscriber(new_items, &sub.preferences);
            if matched.is_empty() {
                None
            } else {
                Some((sub.id.clone(), matched))
            }
        })
        .collect()
}

/// Diffs `previous` against `current` and alerts subscribers about new
/// listings only.
///
/// Removals and quantity changes are computed and returned but never alert.
/// An empty `previous` is a first run and suppresses alerting entirely.
pub async fn dispatch_alerts(
    notifier: &dyn Notifier,
    previous: &[InventoryItem],
    current: &[InventoryItem],
    subscribers: &[Subscriber],
) -> (ChangeSet, DispatchOutcome) {
    let changes = detect(previous, current);
    tracing::info!(
        new = changes.new_items.len(),
        removed = changes.removed_items.len(),
        quantity_changes = changes.quantity_changes.len(),
        "detected inventory changes"
    );

    if previous.is_empty() {
        tracing::info!(
            baseline = current.len(),
            "no previous snapshot; treating this run as the baseline and sending no alerts"
        );
        return (changes, DispatchOutcome::FirstRun);
    }

    let matched = match_subscribers(&changes.new_items, subscribers);
    if matched.is_empty() {
        tracing::info!("no subscriber matched any new item");
        return (changes, DispatchOutcome::NoMatches);
    }

    tracing::info!(
        subscribers = matched.len(),
        notifier = notifier.name(),
        "dispatching alerts"
    );
    let report = notifier.send_batch(subscribers, &matched).await;
    (changes, DispatchOutcome::Dispatched(report))
}
