//! A small TTL cache with an injectable clock.
//!
//! Each component that wants caching owns its own `TtlCache`; nothing is kept
//! in process-wide state, so tests get a fresh cache and can drive expiry with
//! a `ManualClock` (test and `mock` builds only).

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of "now". Production code uses [`SystemClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

#[cfg(any(test, feature = "mock"))]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Bounded map whose entries expire `ttl` after insertion.
///
/// When full, inserting evicts expired entries first and then the oldest entry.
/// A zero capacity disables caching entirely.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: ChronoDuration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX),
            capacity,
            clock,
        }
    }

    /// Returns the cached value when present and not yet expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().ok()?;

        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let now = self.clock.now();
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !self.is_expired(entry, now));
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = clock();
        let cache = TtlCache::new(Duration::from_secs(60), 10, Arc::new(clock.clone()));

        cache.insert("teacher", 1);
        clock.advance(ChronoDuration::seconds(59));
        assert_eq!(cache.get(&"teacher"), Some(1));

        clock.advance(ChronoDuration::seconds(1));
        assert_eq!(cache.get(&"teacher"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_oldest_entry() {
        let clock = clock();
        let cache = TtlCache::new(Duration::from_secs(600), 2, Arc::new(clock.clone()));

        cache.insert("a", 1);
        clock.advance(ChronoDuration::seconds(1));
        cache.insert("b", 2);
        clock.advance(ChronoDuration::seconds(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn full_cache_prefers_dropping_expired_entries() {
        let clock = clock();
        let cache = TtlCache::new(Duration::from_secs(10), 2, Arc::new(clock.clone()));

        cache.insert("stale", 1);
        clock.advance(ChronoDuration::seconds(5));
        cache.insert("fresh", 2);
        clock.advance(ChronoDuration::seconds(6));
        cache.insert("new", 3);

        assert_eq!(cache.get(&"fresh"), Some(2));
        assert_eq!(cache.get(&"new"), Some(3));
    }

    #[test]
    fn overwriting_a_key_refreshes_it_without_eviction() {
        let clock = clock();
        let cache = TtlCache::new(Duration::from_secs(10), 1, Arc::new(clock.clone()));

        cache.insert("a", 1);
        clock.advance(ChronoDuration::seconds(8));
        cache.insert("a", 2);
        clock.advance(ChronoDuration::seconds(8));

        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = TtlCache::new(Duration::from_secs(10), 0, Arc::new(clock()));

        cache.insert("a", 1);

        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = TtlCache::new(Duration::from_secs(10), 4, Arc::new(clock()));

        cache.insert("a", 1);
        cache.invalidate(&"a");

        assert_eq!(cache.get(&"a"), None);
    }
}
