//! Bounded TTL cache
//!
//! A keyed store with a fixed capacity and a fixed time-to-live per entry.
//! Expiry is checked lazily on access; there is no background sweeper. When a
//! `put` would exceed capacity, expired entries are purged first and then the
//! oldest-inserted entry is evicted.
//!
//! `get` and `put` are individually atomic. A "check, then populate" sequence
//! across the two is not, so concurrent cold callers may both compute and both
//! store; the later write simply wins.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Stored value with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    /// An entry is absent from `inserted_at + ttl` onwards
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

#[derive(Debug)]
struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Keys in insertion order, oldest first
    order: VecDeque<K>,
}

/// Keyed store with a maximum entry count and a fixed TTL
#[derive(Debug)]
pub struct TtlCache<K, V> {
    name: &'static str,
    capacity: usize,
    ttl: Duration,
    state: RwLock<CacheState<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache
    ///
    /// # Arguments
    /// * `name` - Label used in log output
    /// * `capacity` - Maximum live entries (at least one is always allowed)
    /// * `ttl` - Lifetime of each entry from its insertion
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            ttl,
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Look up a live entry
    ///
    /// Expired entries read as absent but stay in place until a `put` needs
    /// the room.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let state = self.state.read().await;
        state
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Insert or replace an entry
    ///
    /// Replacing refreshes both the insertion time and the insertion position.
    pub async fn put(&self, key: K, value: V) {
        let mut state = self.state.write().await;
        let now = Instant::now();

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.value = value;
            entry.inserted_at = now;
            state.order.retain(|k| k != &key);
            state.order.push_back(key);
            return;
        }

        if state.entries.len() >= self.capacity {
            let ttl = self.ttl;
            let CacheState { entries, order } = &mut *state;
            entries.retain(|_, entry| !entry.is_expired(ttl));
            order.retain(|k| entries.contains_key(k));
        }

        while state.entries.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(cache = self.name, "evicted oldest entry");
        }

        state.order.push_back(key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.order.clear();
        debug!(cache = self.name, "cache cleared");
    }

    /// Number of live (unexpired) entries
    #[cfg(test)]
    async fn len(&self) -> usize {
        let state = self.state.read().await;
        state
            .entries
            .values()
            .filter(|entry| !entry.is_expired(self.ttl))
            .count()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test(start_paused = true)]
    async fn test_put_then_get() {
        let cache = TtlCache::new("test", 10, TTL);
        cache.put("vm-1".to_string(), 42).await;

        assert_eq!(cache.get("vm-1").await, Some(42));
        assert_eq!(cache.get("vm-2").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new("test", 10, TTL);
        cache.put("vm-1".to_string(), "esx01").await;

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("vm-1").await, Some("esx01"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("vm-1").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let cache = TtlCache::new("test", 3, TTL);
        cache.put("a", 1).await;
        cache.put("b", 2).await;
        cache.put("c", 3).await;

        cache.put("d", 4).await;

        assert_eq!(cache.len().await, 3);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
        assert_eq!(cache.get("c").await, Some(3));
        assert_eq!(cache.get("d").await, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_refreshes_position_and_timestamp() {
        let cache = TtlCache::new("test", 2, TTL);
        cache.put("a", 1).await;
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.put("b", 2).await;
        cache.put("a", 10).await;

        // "b" is now the oldest insertion
        cache.put("c", 3).await;
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await, Some(10));

        // "a" was re-inserted at t=200 and lives until t=500
        tokio::time::advance(Duration::from_secs(200)).await;
        assert_eq!(cache.get("a").await, Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_make_room_first() {
        let cache = TtlCache::new("test", 2, TTL);
        cache.put("old", 1).await;
        tokio::time::advance(Duration::from_secs(100)).await;
        cache.put("young", 2).await;

        tokio::time::advance(Duration::from_secs(250)).await;
        cache.put("new", 3).await;

        // "old" had expired, so nothing live was evicted
        assert_eq!(cache.get("young").await, Some(2));
        assert_eq!(cache.get("new").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_slot_cache() {
        let cache = TtlCache::new("vm_list", 1, TTL);
        cache.put("vms", vec![1, 2, 3]).await;
        cache.put("vms", vec![4]).await;

        assert_eq!(cache.get("vms").await, Some(vec![4]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_still_holds_one() {
        let cache = TtlCache::new("test", 0, TTL);
        cache.put(1_u32, "x").await;
        assert_eq!(cache.get(&1_u32).await, Some("x"));

        cache.put(2_u32, "y").await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&2_u32).await, Some("y"));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = TtlCache::new("test", 10, TTL);
        cache.put("a", 1).await;
        cache.put("b", 2).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.get("a").await, None);
    }
}
