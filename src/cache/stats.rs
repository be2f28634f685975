//! Cache Statistics Module
//!
//! Tracks hits, misses, writes and deletes by observing cache events.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::events::{CacheEvent, CacheObserver, EventName};

// == Cache Stats ==
/// Point-in-time view of the counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (absent, expired, mismatched or store down)
    pub misses: u64,
    /// Field writes
    pub writes: u64,
    /// Field and group deletes
    pub deletes: u64,
    /// Values produced by a recomputation block
    pub generated: u64,
    /// Store commands that failed and were swallowed
    pub store_failures: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Observer that counts events.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    generated: AtomicU64,
    store_failures: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns current cache statistics.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }

    /// Counts a failure reported through the gateway's error handler.
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl CacheObserver for StatsRecorder {
    fn on_event(&self, event: &CacheEvent) {
        let counter = match (event.name, event.hit) {
            (EventName::ReadHashValue | EventName::ReadHash, Some(true)) => &self.hits,
            (EventName::ReadHashValue | EventName::ReadHash, Some(false)) => &self.misses,
            (EventName::WriteHashValue, _) => &self.writes,
            (EventName::DeleteHashValue | EventName::DeleteHash, _) => &self.deletes,
            (EventName::Generate, _) => &self.generated,
            // group reads carry no hit flag
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
