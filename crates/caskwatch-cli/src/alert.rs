//! `caskwatch alert`: diff snapshot files and notify subscribers.

use std::path::Path;

use anyhow::Context;
use caskwatch_alerts::{
    dispatch_alerts, DispatchOutcome, DryRunNotifier, MailgunNotifier, MailgunSettings, Notifier,
};
use caskwatch_core::{
    enabled_subscribers, load_snapshots, load_subscriptions, AppConfig, InventoryItem, Subscriber,
    TransportConfig,
};

use crate::AlertArgs;

/// Picks the dry-run previewer or the live Mailgun transport.
pub(crate) fn build_notifier(
    config: &AppConfig,
    transport: &TransportConfig,
    dry_run: bool,
) -> anyhow::Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(DryRunNotifier::new()));
    }
    let settings = MailgunSettings::from_config(config, transport)
        .context("live alerting needs Mailgun credentials; use --dry-run to preview")?;
    Ok(Box::new(MailgunNotifier::new(settings)?))
}

/// Validated subscribers plus the notifier that will reach them.
///
/// Built before any snapshot is touched, so a bad subscriber file or missing
/// credentials abort the run while the previous baseline is still on disk.
pub(crate) struct AlertPlan {
    subscribers: Vec<Subscriber>,
    notifier: Box<dyn Notifier>,
}

impl AlertPlan {
    /// Loads and validates `subscriptions`. `None` means alerting is off.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscriber config is invalid or the notifier
    /// cannot be built.
    pub(crate) fn load(
        config: &AppConfig,
        subscriptions: Option<&Path>,
        dry_run: bool,
    ) -> anyhow::Result<Option<Self>> {
        let Some(path) = subscriptions else {
            return Ok(None);
        };

        let subscription_config = load_subscriptions(path)
            .with_context(|| format!("failed to load subscriptions from {}", path.display()))?;
        let subscribers = enabled_subscribers(&subscription_config);
        tracing::info!(enabled = subscribers.len(), "loaded subscribers");

        let notifier = build_notifier(config, &subscription_config.transport, dry_run)?;
        Ok(Some(Self {
            subscribers,
            notifier,
        }))
    }

    /// Alerts subscribers about items new in `current`.
    ///
    /// # Errors
    ///
    /// Returns an error if any alert failed to send, after every send was
    /// attempted.
    pub(crate) async fn dispatch(
        &self,
        previous: &[InventoryItem],
        current: &[InventoryItem],
    ) -> anyhow::Result<DispatchOutcome> {
        let (changes, outcome) =
            dispatch_alerts(self.notifier.as_ref(), previous, current, &self.subscribers).await;

        println!(
            "{} new, {} removed, {} quantity changes",
            changes.new_items.len(),
            changes.removed_items.len(),
            changes.quantity_changes.len()
        );

        match &outcome {
            DispatchOutcome::FirstRun => {
                println!("No previous snapshot; baseline recorded, no alerts sent");
            }
            DispatchOutcome::NoMatches => println!("No new items matched any subscriber"),
            DispatchOutcome::Dispatched(report) => {
                println!(
                    "Alerts sent: {}, failed: {}",
                    report.sent.len(),
                    report.failure_count()
                );
                if !report.is_success() {
                    let failed: Vec<&str> = report
                        .failed
                        .iter()
                        .map(|f| f.subscriber_id.as_str())
                        .collect();
                    anyhow::bail!(
                        "{} alert(s) failed to send: {}",
                        report.failure_count(),
                        failed.join(", ")
                    );
                }
            }
        }

        Ok(outcome)
    }
}

pub(crate) fn log_alerting_disabled() {
    tracing::info!("no subscriptions file given; skipping alerts");
}

/// # Errors
///
/// See [`AlertPlan::load`] and [`AlertPlan::dispatch`].
pub(crate) async fn run_alert(config: &AppConfig, args: &AlertArgs) -> anyhow::Result<()> {
    let Some(plan) = AlertPlan::load(config, args.subscriptions.as_deref(), args.dry_run)? else {
        log_alerting_disabled();
        return Ok(());
    };

    let previous = load_snapshots(&args.previous);
    let current = load_snapshots(&args.current);
    tracing::info!(
        previous = previous.len(),
        current = current.len(),
        "loaded snapshots"
    );

    plan.dispatch(&previous, &current).await.map(|_| ())
}
