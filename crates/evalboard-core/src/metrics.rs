//! Global atomic counters for evalboard observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. after a leaderboard rebuild).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed atomic counters.
pub struct Metrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    submissions_loaded: AtomicU64,
    submissions_skipped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            submissions_loaded: AtomicU64::new(0),
            submissions_skipped: AtomicU64::new(0),
        }
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cache_hits", "counter incremented");
    }

    pub fn inc_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cache_misses", "counter incremented");
    }

    pub fn inc_submissions_loaded(&self) {
        self.submissions_loaded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "submissions_loaded", "counter incremented");
    }

    pub fn inc_submissions_skipped(&self) {
        self.submissions_skipped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "submissions_skipped", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            cache_hits = self.cache_hits(),
            cache_misses = self.cache_misses(),
            submissions_loaded = self.submissions_loaded(),
            submissions_skipped = self.submissions_skipped(),
        );
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn submissions_loaded(&self) -> u64 {
        self.submissions_loaded.load(Ordering::Relaxed)
    }

    pub fn submissions_skipped(&self) -> u64 {
        self.submissions_skipped.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.submissions_loaded.store(0, Ordering::Relaxed);
        self.submissions_skipped.store(0, Ordering::Relaxed);
    }
}
