//! Worker counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for fetch handling and background refreshes.
#[derive(Debug, Default)]
pub struct WorkerStats {
    cache_hits: AtomicU64,
    network_responses: AtomicU64,
    offline_fallbacks: AtomicU64,
    bypassed: AtomicU64,
    refreshes_stored: AtomicU64,
    refreshes_failed: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStatsSnapshot {
    /// Requests answered from the cache.
    pub cache_hits: u64,
    /// Cache misses answered from the network.
    pub network_responses: u64,
    /// Cache misses answered with the offline notice.
    pub offline_fallbacks: u64,
    /// Requests left to default handling.
    pub bypassed: u64,
    /// Background refreshes written to the cache.
    pub refreshes_stored: u64,
    /// Background refreshes that got no response or could not be stored.
    pub refreshes_failed: u64,
}

impl WorkerStatsSnapshot {
    /// Requests the worker answered itself.
    pub fn handled(&self) -> u64 {
        self.cache_hits + self.misses()
    }

    /// Intercepted requests with no cache entry.
    pub fn misses(&self) -> u64 {
        self.network_responses + self.offline_fallbacks
    }
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network(&self) {
        self.network_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_offline(&self) {
        self.offline_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bypass(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_stored(&self) {
        self.refreshes_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_failed(&self) {
        self.refreshes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            network_responses: self.network_responses.load(Ordering::Relaxed),
            offline_fallbacks: self.offline_fallbacks.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            refreshes_stored: self.refreshes_stored.load(Ordering::Relaxed),
            refreshes_failed: self.refreshes_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let stats = WorkerStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_offline();
        stats.record_bypass();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 2);
        assert_eq!(snapshot.handled(), 3);
        assert_eq!(snapshot.misses(), 1);
        assert_eq!(snapshot.bypassed, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = WorkerStats::new();
        stats.record_refresh_failed();

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["refreshes_failed"], 1);
        assert_eq!(json["cache_hits"], 0);
    }
}
