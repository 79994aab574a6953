//! Time-to-live memoization for expensive listing and ranking results.
//!
//! A lookup hits only while `now - stored_at < ttl`. Expired entries stay in
//! the map until the next `put` for the same key overwrites them; there is no
//! background sweeper. Concurrent misses on one key each recompute and the
//! last `put` wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::metrics::METRICS;
use crate::obs;

/// Default time-to-live: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cached value and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

/// Key/value cache whose entries expire after a fixed TTL.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(entry.stored_at).to_std() {
            Ok(elapsed) => elapsed < self.ttl,
            // stored in the future relative to `now`: the clock stepped back
            Err(_) => true,
        }
    }

    /// The value for `key`, if present and younger than the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let hit = self
            .entries()
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone());

        if hit.is_some() {
            METRICS.inc_cache_hits();
        } else {
            METRICS.inc_cache_misses();
        }
        obs::emit_cache_lookup(key, hit.is_some());
        hit
    }

    /// Store `value` under `key`, overwriting any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries().insert(key.into(), entry);
    }

    /// Return the cached value, or compute, store and return a fresh one.
    ///
    /// The lock is not held while `compute` runs. Errors are returned as-is
    /// and nothing is stored.
    pub fn get_or_try_insert_with<E, F>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = compute()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    fn cache_with_clock() -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = TtlCache::with_clock(DEFAULT_TTL, clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_put_then_get_hits() {
        let (_clock, cache) = cache_with_clock();
        cache.put("leaderboard:design2code", "board".to_string());
        assert_eq!(cache.get("leaderboard:design2code").as_deref(), Some("board"));
    }

    #[test]
    fn test_get_after_ttl_misses() {
        let (clock, cache) = cache_with_clock();
        cache.put("k", "v".to_string());
        clock.advance(Duration::from_secs(299));
        assert!(cache.get("k").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none(), "entry at exactly ttl must be stale");
    }

    #[test]
    fn test_staleness_spans_days() {
        let (clock, cache) = cache_with_clock();
        cache.put("k", "v".to_string());
        clock.advance(Duration::from_secs(86_400 + 10));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let (clock, cache) = cache_with_clock();
        cache.put("k", "old".to_string());
        clock.advance(Duration::from_secs(400));
        assert!(cache.get("k").is_none());
        cache.put("k", "new".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key_misses() {
        let (_clock, cache) = cache_with_clock();
        assert!(cache.get("absent").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with_computes_once_while_fresh() {
        let (clock, cache) = cache_with_clock();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>("computed".to_string())
        };

        assert_eq!(cache.get_or_try_insert_with("k", compute).unwrap(), "computed");
        assert_eq!(cache.get_or_try_insert_with("k", compute).unwrap(), "computed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(DEFAULT_TTL);
        cache.get_or_try_insert_with("k", compute).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_compute_stores_nothing() {
        let (_clock, cache) = cache_with_clock();
        let result = cache.get_or_try_insert_with("k", || Err::<String, _>("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (_clock, cache) = cache_with_clock();
        cache.put("a", "1".to_string());
        cache.put("b", "2".to_string());
        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_last_writer_wins() {
        let cache = Arc::new(TtlCache::<usize>::new(DEFAULT_TTL));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        cache.put("shared", i);
                        let _ = cache.get("shared");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread panicked");
        }
        let value = cache.get("shared").expect("present");
        assert!(value < 8);
        assert_eq!(cache.len(), 1);
    }
}
