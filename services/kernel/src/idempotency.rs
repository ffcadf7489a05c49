//! Submission deduplication cache
//!
//! Client retries within the window get the original outcome back verbatim
//! and cause zero new events. The cache is flushed every 100 ticks — a
//! pragmatic bound, not a correctness requirement: a retry after a flush
//! re-executes, and both paths are safe because re-execution is itself a
//! fresh, fully validated submission.

use std::collections::HashMap;
use types::action::SubmitOutcome;

/// Flush cadence in ticks.
pub const FLUSH_INTERVAL_TICKS: u64 = 100;

/// Kernel-owned idempotency cache keyed by opaque client strings.
#[derive(Debug, Clone, Default)]
pub struct IdempotencyCache {
    entries: HashMap<String, SubmitOutcome>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SubmitOutcome> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, outcome: SubmitOutcome) {
        self.entries.insert(key.into(), outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear the cache when the tick counter crosses a flush boundary.
    pub fn flush_if_due(&mut self, current_tick: u64) {
        if current_tick > 0 && current_tick % FLUSH_INTERVAL_TICKS == 0 {
            self.entries.clear();
        }
    }
}
