//! Bounded in-memory cache with per-entry time-to-live.
//!
//! Both the quote cache and the user-privilege cache are instances of
//! [`TtlCache`]. Entries expire lazily: a stale entry is treated as
//! absent (and dropped) the next time it is read, no background task
//! sweeps the map. Capacity is enforced on insert by evicting the
//! oldest-inserted key.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A stored value together with its insertion timestamp.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe key-value cache with a fixed TTL and bounded capacity.
///
/// Reads and writes from concurrent request handlers are safe: the map
/// itself is sharded, and the insertion-order queue used for eviction is
/// guarded by a mutex held only for the duration of one insert.
#[derive(Debug)]
pub struct TtlCache<K: Eq + Hash, V> {
    entries: DashMap<K, Entry<V>>,
    /// Keys in insertion order; front is the eviction candidate.
    order: Mutex<VecDeque<K>>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries, each live for
    /// `ttl` from its insertion.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::with_capacity(capacity)),
            ttl,
            capacity,
        }
    }

    /// Returns the live value for `key`, or `None` if the key is absent
    /// or its entry has outlived the TTL. Stale entries are removed on
    /// observation.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // The guard was released before this point, so a concurrent
            // insert may have replaced the entry; only drop it if it is
            // still stale.
            self.entries
                .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        None
    }

    /// Inserts `value` under `key`, overwriting any prior entry and
    /// resetting its TTL. Evicts the oldest-inserted key first when the
    /// cache is at capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut order = self.order.lock();

        if self.entries.contains_key(&key) {
            // Overwrite: move the key to the back of the eviction queue.
            order.retain(|k| k != &key);
        } else {
            while self.entries.len() >= self.capacity {
                match order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        order.push_back(key.clone());
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently stored, stale entries included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60), 10);

        cache.insert("AAPL".to_string(), 7);
        assert_eq!(cache.get(&"AAPL".to_string()), Some(7));
        assert_eq!(cache.get(&"MSFT".to_string()), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lazy_expiry_treats_stale_as_absent() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(20), 10);

        cache.insert("AAPL".to_string(), 7);
        std::thread::sleep(Duration::from_millis(40));

        assert_eq!(cache.get(&"AAPL".to_string()), None);
        // The stale entry was dropped on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_millis(50), 10);

        cache.insert("AAPL".to_string(), 1);
        std::thread::sleep(Duration::from_millis(30));
        cache.insert("AAPL".to_string(), 2);
        std::thread::sleep(Duration::from_millis(30));

        // 60ms after the first insert but only 30ms after the overwrite.
        assert_eq!(cache.get(&"AAPL".to_string()), Some(2));
    }

    #[test]
    fn test_capacity_evicts_oldest_inserted() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60), 2);

        cache.insert("A".to_string(), 1);
        cache.insert("B".to_string(), 2);
        cache.insert("C".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"A".to_string()), None);
        assert_eq!(cache.get(&"B".to_string()), Some(2));
        assert_eq!(cache.get(&"C".to_string()), Some(3));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60), 2);

        cache.insert("A".to_string(), 1);
        cache.insert("B".to_string(), 2);
        // Rewriting an existing key must not push anything out.
        cache.insert("A".to_string(), 10);

        assert_eq!(cache.get(&"A".to_string()), Some(10));
        assert_eq!(cache.get(&"B".to_string()), Some(2));
    }

    #[test]
    fn test_overwritten_key_becomes_newest() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60), 2);

        cache.insert("A".to_string(), 1);
        cache.insert("B".to_string(), 2);
        cache.insert("A".to_string(), 10);
        cache.insert("C".to_string(), 3);

        // B was the oldest insertion after A's refresh.
        assert_eq!(cache.get(&"B".to_string()), None);
        assert_eq!(cache.get(&"A".to_string()), Some(10));
        assert_eq!(cache.get(&"C".to_string()), Some(3));
    }

    #[test]
    fn test_expiry_cleanup_does_not_drop_concurrent_insert() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let ttl = Duration::from_millis(5);
        let cache: Arc<TtlCache<String, u64>> = Arc::new(TtlCache::new(ttl, 16));
        let key = "AAPL".to_string();
        let done = Arc::new(AtomicBool::new(false));

        // Readers hammer the stale-cleanup path while the writer below
        // keeps replacing the entry.
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();

        for round in 0..50u64 {
            // Let the previous entry go stale first so reads observe it
            // as expired right when the fresh value lands.
            std::thread::sleep(Duration::from_millis(10));

            let written_at = Instant::now();
            cache.insert(key.clone(), round);
            let got = cache.get(&key);

            // A fresh write must never be lost to a reader that raced
            // on the stale entry it replaced. Only assert when we know
            // the read-back happened inside the TTL window.
            if written_at.elapsed() < ttl {
                assert_eq!(got, Some(round));
            }
        }

        done.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().expect("reader thread");
        }
    }

    #[test]
    fn test_json_payload_values() {
        let cache: TtlCache<String, serde_json::Value> =
            TtlCache::new(Duration::from_secs(60), 10);

        let payload = serde_json::json!({"results": [{"symbol": "AAPL", "regularMarketPrice": 187.3}]});
        cache.insert("AAPL".to_string(), payload.clone());
        assert_eq!(cache.get(&"AAPL".to_string()), Some(payload));
    }
}
