//! Alert delivery.

mod dry_run;
mod mailgun;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use caskwatch_core::{InventoryItem, Subscriber};

use crate::error::NotifyError;

pub use dry_run::DryRunNotifier;
pub use mailgun::{MailgunNotifier, MailgunSettings};

/// A subscriber whose alert could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSend {
    pub subscriber_id: String,
    pub reason: String,
}

/// Result of one batch: who was alerted and who was not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: Vec<String>,
    pub failed: Vec<FailedSend>,
}

impl BatchReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A transport that delivers per-subscriber alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Pause after each successful send while more remain.
    fn send_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Delivers one alert listing `items` to `subscriber`.
    async fn send_alert(
        &self,
        subscriber: &Subscriber,
        items: &[InventoryItem],
    ) -> Result<(), NotifyError>;

    /// Sends each subscriber their matched items, in subscriber order.
    ///
    /// Subscribers without an entry, or with an empty one, are skipped. A
    /// failed send is logged and recorded; it never stops the batch.
    async fn send_batch(
        &self,
        subscribers: &[Subscriber],
        items_by_subscriber: &BTreeMap<String, Vec<InventoryItem>>,
    ) -> BatchReport {
        let pending: Vec<(&Subscriber, &Vec<InventoryItem>)> = subscribers
            .iter()
            .filter_map(|sub| {
                items_by_subscriber
                    .get(&sub.id)
                    .filter(|items| !items.is_empty())
                    .map(|items| (sub, items))
            })
            .collect();

        let mut report = BatchReport::default();
        let delay = self.send_delay();

        for (idx, (subscriber, items)) in pending.iter().enumerate() {
            match self.send_alert(subscriber, items).await {
                Ok(()) => {
                    tracing::info!(
                        notifier = self.name(),
                        subscriber = %subscriber.id,
                        items = items.len(),
                        "alert sent"
                    );
                    report.sent.push(subscriber.id.clone());
                    if idx + 1 < pending.len() && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        notifier = self.name(),
                        subscriber = %subscriber.id,
                        error = %e,
                        "alert failed"
                    );
                    report.failed.push(FailedSend {
                        subscriber_id: subscriber.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            notifier = self.name(),
            sent = report.sent.len(),
            failed = report.failed.len(),
            "alert batch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caskwatch_core::{Location, Preferences};
    use chrono::Utc;
    use std::sync::Mutex;

    struct FlakyNotifier {
        fail_for: &'static str,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn send_alert(
            &self,
            subscriber: &Subscriber,
            _items: &[InventoryItem],
        ) -> Result<(), NotifyError> {
            self.attempts.lock().unwrap().push(subscriber.id.clone());
            if subscriber.id == self.fail_for {
                Err(NotifyError::Rejected {
                    status: 400,
                    body: "bad recipient".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn subscriber(id: &str) -> Subscriber {
        Subscriber {
            id: id.to_owned(),
            email: format!("{id}@example.com"),
            enabled: true,
            preferences: Preferences::default(),
        }
    }

    fn item() -> InventoryItem {
        InventoryItem {
            timestamp: Utc::now(),
            product_name: "Buffalo Trace".to_owned(),
            product_id: "018006".to_owned(),
            location: Location::default(),
            quantity: 1,
            store_id: "416".to_owned(),
            store_url: String::new(),
            state: "VA".to_owned(),
            county: String::new(),
            listing_type: String::new(),
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let notifier = FlakyNotifier {
            fail_for: "b",
            attempts: Mutex::new(Vec::new()),
        };
        let subscribers = vec![subscriber("a"), subscriber("b"), subscriber("c"), subscriber("d")];
        let mut items = BTreeMap::new();
        items.insert("a".to_owned(), vec![item()]);
        items.insert("b".to_owned(), vec![item()]);
        items.insert("c".to_owned(), vec![item()]);
        items.insert("d".to_owned(), Vec::new());

        let report = notifier.send_batch(&subscribers, &items).await;

        assert_eq!(report.sent, vec!["a", "c"]);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].subscriber_id, "b");
        assert!(!report.is_success());
        assert_eq!(
            *notifier.attempts.lock().unwrap(),
            vec!["a", "b", "c"],
            "subscribers with nothing matched are not contacted"
        );
    }
}
