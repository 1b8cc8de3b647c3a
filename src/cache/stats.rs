//! Cache Statistics Module
//!
//! Tracks local cache performance: hits, misses, evictions and byte usage.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of a local cache's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries pushed out by the byte budget
    pub evictions: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Bytes currently charged against the budget
    pub used_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Update Occupancy ==
    pub fn set_occupancy(&mut self, entries: usize, used_bytes: usize) {
        self.total_entries = entries;
        self.used_bytes = used_bytes;
    }
}
