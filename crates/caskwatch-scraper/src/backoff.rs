//! Run-scoped adaptive backoff for sequential store polling.
//!
//! A non-success response from any store is read as global upstream
//! throttling, so the wait multiplier is shared across stores. The attempt
//! counter is per store, bounding how long one bad store can hold the run.
//!
//! | Event | Multiplier | Store attempts |
//! |---|---|---|
//! | failure, attempts < max | sleep `current`, then `current * 2` (capped) | +1 |
//! | failure, attempts == max | reset to floor, store abandoned | +1 |
//! | success | `current / 2` (never below floor) | unchanged |

use std::collections::HashMap;

/// Lowest value of the wait multiplier.
pub const BACKOFF_FLOOR: u64 = 1;

/// What the caller should do after a failed store request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Sleep `wait` backoff units, then retry the same store.
    Retry { wait: u64 },
    /// Stop trying this store for the rest of the run.
    Abandon { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct StoreBackoff {
    current: u64,
    ceiling: u64,
    max_retries: u32,
    attempts: HashMap<String, u32>,
}

impl StoreBackoff {
    #[must_use]
    pub fn new(max_retries: u32, ceiling: u64) -> Self {
        Self {
            current: BACKOFF_FLOOR,
            ceiling: ceiling.max(BACKOFF_FLOOR),
            max_retries: max_retries.max(1),
            attempts: HashMap::new(),
        }
    }

    /// Current wait multiplier, in backoff units.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Failed attempts recorded so far for `store`.
    #[must_use]
    pub fn attempts(&self, store: &str) -> u32 {
        self.attempts.get(store).copied().unwrap_or(0)
    }

    pub fn record_failure(&mut self, store: &str) -> FailureAction {
        let attempts = self.attempts.entry(store.to_owned()).or_insert(0);
        *attempts += 1;

        if *attempts >= self.max_retries {
            self.current = BACKOFF_FLOOR;
            return FailureAction::Abandon {
                attempts: *attempts,
            };
        }

        let wait = self.current;
        self.current = self.current.saturating_mul(2).min(self.ceiling);
        FailureAction::Retry { wait }
    }

    pub fn record_success(&mut self) {
        self.current = (self.current / 2).max(BACKOFF_FLOOR);
    }
}
