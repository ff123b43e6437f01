use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::PersistOutcome;

/// Tracks preload and durable cache activity
#[derive(Debug, Default)]
pub struct PreloadMetrics {
    load_times: RwLock<HashMap<String, Duration>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    stored: AtomicU64,
    persist_failures: AtomicU64,
    failed_loads: AtomicU64,
}

impl PreloadMetrics {
    /// Create a new instance of PreloadMetrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long a resource took to reach initial data
    pub fn record_load_time(&self, url: &str, duration: Duration) {
        self.load_times.write().insert(url.to_string(), duration);
    }

    /// Record a durable cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a durable cache miss (including an unreadable store)
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resource that ended in `failed`
    pub fn record_failed_load(&self) {
        self.failed_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a persistence attempt
    pub fn record_persist(&self, outcome: &PersistOutcome) {
        match outcome {
            PersistOutcome::AlreadyCached => {}
            PersistOutcome::Stored => {
                self.stored.fetch_add(1, Ordering::Relaxed);
            }
            PersistOutcome::CacheUnavailable(_) | PersistOutcome::FetchFailed(_) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get the cache hit rate as a percentage
    pub fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f32;
        let misses = self.cache_misses.load(Ordering::Relaxed) as f32;

        if hits + misses > 0.0 {
            hits / (hits + misses) * 100.0
        } else {
            0.0
        }
    }

    /// Number of cache hits
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Number of cache misses
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Number of entries written to the durable cache
    pub fn stored_entries(&self) -> u64 {
        self.stored.load(Ordering::Relaxed)
    }

    /// Number of persistence attempts that failed
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    /// Number of resources that ended in `failed`
    pub fn failed_loads(&self) -> u64 {
        self.failed_loads.load(Ordering::Relaxed)
    }

    /// Get the recorded load time for a resource
    pub fn load_time(&self, url: &str) -> Option<Duration> {
        self.load_times.read().get(url).cloned()
    }

    /// Get all recorded load times
    pub fn all_load_times(&self) -> HashMap<String, Duration> {
        self.load_times.read().clone()
    }
}

/// A thread-safe wrapper around PreloadMetrics
#[derive(Debug, Clone, Default)]
pub struct PreloadMetricsHandle(Arc<PreloadMetrics>);

impl PreloadMetricsHandle {
    /// Create a new metrics handle
    pub fn new() -> Self {
        Self(Arc::new(PreloadMetrics::new()))
    }

    /// Get a reference to the underlying metrics
    pub fn inner(&self) -> &PreloadMetrics {
        &self.0
    }
}

impl std::ops::Deref for PreloadMetricsHandle {
    type Target = PreloadMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
