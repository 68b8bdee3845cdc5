//! Prints what would be sent instead of sending it.

use std::sync::Mutex;

use async_trait::async_trait;
use caskwatch_core::{InventoryItem, Subscriber};

use super::Notifier;
use crate::error::NotifyError;
use crate::render::{item_line, subject};

#[derive(Debug, Default)]
pub struct DryRunNotifier {
    previews: Mutex<Vec<String>>,
}

impl DryRunNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every preview printed so far, in send order.
    #[must_use]
    pub fn previews(&self) -> Vec<String> {
        self.previews
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

fn preview(subscriber: &Subscriber, items: &[InventoryItem]) -> String {
    let mut out = format!(
        "[dry-run] to {} <{}>: {}",
        subscriber.id,
        subscriber.email,
        subject(items.len())
    );
    for item in items {
        out.push_str("\n  - ");
        out.push_str(&item_line(item));
    }
    out
}

#[async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn send_alert(
        &self,
        subscriber: &Subscriber,
        items: &[InventoryItem],
    ) -> Result<(), NotifyError> {
        let text = preview(subscriber, items);
        println!("{text}");
        if let Ok(mut previews) = self.previews.lock() {
            previews.push(text);
        }
        Ok(())
    }
}
