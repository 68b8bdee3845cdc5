//! The capability every inventory source exposes to the pipeline.

use async_trait::async_trait;
use caskwatch_core::{InventoryItem, Jurisdiction, RefreshScope, SnapshotUpdate};

use crate::error::ScraperError;

/// A store or product the source had to give up on for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub unit: String,
    pub reason: String,
}

/// Best-effort result of one poll.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub jurisdiction: Jurisdiction,
    pub scope: RefreshScope,
    pub items: Vec<InventoryItem>,
    pub skipped: Vec<SkippedUnit>,
}

impl PollReport {
    #[must_use]
    pub fn into_update(self) -> SnapshotUpdate {
        SnapshotUpdate {
            jurisdiction: self.jurisdiction,
            scope: self.scope,
            items: self.items,
        }
    }
}

/// A retail inventory source.
///
/// Implementations share no state; each poll is self-contained and safe to
/// repeat on the same instance.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Human-readable name, e.g. `"VA ABC"`.
    fn name(&self) -> &str;

    fn jurisdiction(&self) -> Jurisdiction;

    fn store_count(&self) -> usize;

    /// Product codes this source knows about, without ID prefixes.
    fn product_codes(&self) -> Vec<String>;

    /// Fetch current stock as canonical items.
    ///
    /// Per-unit failures are logged and reported in
    /// [`PollReport::skipped`]; `Err` means nothing at all could be polled.
    async fn poll(&self) -> Result<PollReport, ScraperError>;
}
