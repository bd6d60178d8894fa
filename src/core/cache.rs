//! Time-bounded cache shared by the boards and file-search paths
//!
//! Entries older than the configured duration behave as absent on read; they
//! are only physically removed by `sweep_expired`, which the orchestrator runs
//! at the start of every request, so a stale entry may linger in memory for
//! roughly one request interval.
//!
//! Keys are composite: resource id + minute bucket + optional variant. The
//! bucket is recomputed at read and write, so a read in the same minute as a
//! write always hits and a read crossing a minute boundary always misses even
//! when the underlying data is unchanged. That is a deliberate (if crude)
//! recency heuristic kept for compatibility, not a correctness mechanism.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::time::Instant;

/// Composite cache key: `{resource}_{YYYYmmdd_HH_MM}[_variant]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key bucketed to the minute of `at`.
    ///
    /// The variant suffix keeps logically different queries for the same
    /// resource apart (e.g. a board query that also pulls epics).
    pub fn bucketed(resource: &str, at: NaiveDateTime, variant: Option<&str>) -> Self {
        let bucket = at.format("%Y%m%d_%H_%M");
        match variant {
            Some(v) => Self(format!("{}_{}_{}", resource, bucket, v)),
            None => Self(format!("{}_{}", resource, bucket)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Generic TTL cache: `get` / `put` / `sweep_expired`
///
/// Interior mutability behind a `Mutex` so handlers on parallel tasks can
/// share one instance through an `Arc`; no lock is ever held across an await.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<CacheKey, Entry<V>>>,
    duration: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(duration: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            duration,
        }
    }

    /// Returns the stored value only while younger than the duration; an
    /// expired entry reads as a miss but is not deleted here.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|e| e.inserted_at.elapsed() < self.duration)
            .map(|e| e.value.clone())
    }

    pub fn put(&self, key: CacheKey, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                Entry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Drops every entry older than the duration; returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, e| e.inserted_at.elapsed() < self.duration);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn same_minute_same_key() {
        let a = CacheKey::bucketed("Sonar", at(10, 30, 5), None);
        let b = CacheKey::bucketed("Sonar", at(10, 30, 59), None);
        assert_eq!(a, b);
    }

    #[test]
    fn minute_boundary_changes_key() {
        let a = CacheKey::bucketed("Sonar", at(10, 30, 59), None);
        let b = CacheKey::bucketed("Sonar", at(10, 31, 0), None);
        assert_ne!(a, b);
    }

    #[test]
    fn variant_keeps_queries_apart() {
        let plain = CacheKey::bucketed("Sonar", at(10, 30, 0), None);
        let epics = CacheKey::bucketed("Sonar", at(10, 30, 0), Some("epicos"));
        assert_ne!(plain, epics);
        assert!(epics.as_str().ends_with("_epicos"));
    }

    #[tokio::test(start_paused = true)]
    async fn get_after_put_returns_value() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let key = CacheKey::bucketed("Sonar", at(10, 30, 0), None);
        cache.put(key.clone(), "dados".to_string());
        assert_eq!(cache.get(&key), Some("dados".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_reads_as_miss_until_swept() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let key = CacheKey::bucketed("Sonar", at(10, 30, 0), None);
        cache.put(key.clone(), 42u32);

        tokio::time::advance(Duration::from_secs(301)).await;

        // Miss, but still occupying memory
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_keeps_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let old = CacheKey::bucketed("a", at(10, 0, 0), None);
        cache.put(old.clone(), 1u32);

        tokio::time::advance(Duration::from_secs(299)).await;
        let fresh = CacheKey::bucketed("b", at(10, 5, 0), None);
        cache.put(fresh.clone(), 2u32);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.get(&fresh), Some(2));
        assert_eq!(cache.get(&old), None);
    }
}
