//! Snapshot persistence and merge.
//!
//! A snapshot is a flat JSON array of [`InventoryItem`] records with no
//! envelope. It is the only artifact that crosses process boundaries.
//! Reads are forgiving: a missing or corrupt file is an empty snapshot.
//! Writes are strict and atomic.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::SnapshotError;
use crate::inventory::{InventoryItem, Jurisdiction};

/// How much of a jurisdiction a poll actually refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshScope {
    /// Every product of the jurisdiction was polled.
    Jurisdiction,
    /// Only these product codes (unprefixed) were polled.
    Products(HashSet<String>),
}

impl RefreshScope {
    #[must_use]
    pub fn covers(&self, product_code: &str) -> bool {
        match self {
            RefreshScope::Jurisdiction => true,
            RefreshScope::Products(codes) => codes.contains(product_code),
        }
    }
}

/// Fresh observations for one jurisdiction, ready to merge.
#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    pub jurisdiction: Jurisdiction,
    pub scope: RefreshScope,
    pub items: Vec<InventoryItem>,
}

/// Loads a snapshot file, treating absence or corruption as empty.
#[must_use]
pub fn load_snapshot(path: &Path) -> Vec<InventoryItem> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "no prior snapshot; starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<InventoryItem>>(&content) {
        Ok(items) => {
            tracing::debug!(path = %path.display(), count = items.len(), "loaded snapshot");
            items
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt snapshot; starting empty");
            Vec::new()
        }
    }
}

/// Loads and concatenates several snapshot files in order.
#[must_use]
pub fn load_snapshots<P: AsRef<Path>>(paths: &[P]) -> Vec<InventoryItem> {
    paths
        .iter()
        .flat_map(|p| load_snapshot(p.as_ref()))
        .collect()
}

/// Writes `items` to `path` as pretty JSON via a temp file and rename.
///
/// # Errors
///
/// Returns [`SnapshotError`] if serialization, the temp write, or the rename
/// fails. Callers must treat this as a failed run.
pub fn save_snapshot(path: &Path, items: &[InventoryItem]) -> Result<(), SnapshotError> {
    let body = serde_json::to_vec_pretty(items)?;
    let tmp_path = path.with_file_name(format!(
        ".{}.tmp",
        path.file_name()
            .map_or_else(|| "snapshot".into(), |n| n.to_string_lossy())
    ));

    let write_err = |source| SnapshotError::Write {
        path: path.display().to_string(),
        source,
    };
    std::fs::write(&tmp_path, body).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(source)
    })?;

    tracing::debug!(path = %path.display(), count = items.len(), "snapshot written");
    Ok(())
}

/// Merges fresh observations into an existing snapshot.
///
/// Stored items covered by an update (same jurisdiction, product within the
/// update's scope) are displaced; everything else is carried forward. The
/// result holds at most one record per `(product_id, store_id)`, the last
/// write winning.
#[must_use]
pub fn merge_snapshot(
    existing: Vec<InventoryItem>,
    updates: Vec<SnapshotUpdate>,
) -> Vec<InventoryItem> {
    let carried: Vec<InventoryItem> = existing
        .into_iter()
        .filter(|item| {
            let jurisdiction = item.jurisdiction();
            !updates
                .iter()
                .any(|u| u.jurisdiction == jurisdiction && u.scope.covers(item.product_code()))
        })
        .collect();
    let fresh = updates.into_iter().flat_map(|u| u.items);

    dedup_by_key(carried.into_iter().chain(fresh))
}

fn dedup_by_key(items: impl Iterator<Item = InventoryItem>) -> Vec<InventoryItem> {
    let mut merged: Vec<InventoryItem> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for item in items {
        let key = (item.product_id.clone(), item.store_id.clone());
        if let Some(&slot) = index.get(&key) {
            merged[slot] = item;
        } else {
            index.insert(key, merged.len());
            merged.push(item);
        }
    }

    merged
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
