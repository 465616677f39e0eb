//! Time-bounded, capacity-bounded caching.
//!
//! [`TtlCache`] is the single caching primitive used by every derived
//! market-data product. Each instance has a fixed capacity and a fixed
//! time-to-live; entries leave the cache either when a read observes that
//! they have expired or when capacity pressure evicts the least recently
//! used entry.
//!
//! Expiry and recency are tracked independently: a fresh entry can be
//! evicted for capacity, and an expired entry lingers until it is read or
//! pushed out.
//!
//! # Concurrency
//!
//! All lookups and mutations run inside one short critical section per
//! instance. The cache never computes values itself, so two callers that
//! miss the same key concurrently will both compute and both call
//! [`TtlCache::set`]; the last write wins.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use market_core::cache::TtlCache;
//!
//! let cache: TtlCache<String, u32> = TtlCache::new(2, Duration::from_secs(60));
//! cache.set("a".to_string(), 1);
//! cache.set("b".to_string(), 2);
//! assert_eq!(cache.get("a"), Some(1));
//!
//! // "b" is now least recently used and is evicted first
//! cache.set("c".to_string(), 3);
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.len(), 2);
//! ```

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    expires_at: Instant,
    /// Position in the recency index.
    touched: u64,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Slot<V>>,
    /// touch counter -> key, oldest first
    recency: BTreeMap<u64, K>,
    counter: u64,
}

impl<K, V> Inner<K, V> {
    fn next_touch(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

/// Bounded key/value cache with a per-instance TTL and LRU eviction.
///
/// Values are returned by clone; wrap large values in `Arc` to keep hits
/// cheap.
///
/// # Type Parameters
///
/// * `K` - Key type
/// * `V` - Value type
/// * `C` - Time source, [`SystemClock`] unless a test injects another
#[derive(Debug)]
pub struct TtlCache<K, V, C = SystemClock> {
    max_size: usize,
    ttl: Duration,
    clock: C,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `max_size` entries, each living `ttl`.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self::with_clock(max_size, ttl, SystemClock)
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create a cache that reads time from `clock`.
    pub fn with_clock(max_size: usize, ttl: Duration, clock: C) -> Self {
        Self {
            max_size,
            ttl,
            clock,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                counter: 0,
            }),
        }
    }

    /// Look up `key`.
    ///
    /// Returns `None` if the key is unknown or its entry has expired; an
    /// expired entry is removed. A hit marks the entry most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let mut guard = self.lock();
        let inner = &mut *guard;

        let (expires_at, touched) = {
            let slot = inner.entries.get(key)?;
            (slot.expires_at, slot.touched)
        };

        if expires_at <= now {
            inner.entries.remove(key);
            inner.recency.remove(&touched);
            return None;
        }

        let touch = inner.next_touch();
        if let Some(owned) = inner.recency.remove(&touched) {
            inner.recency.insert(touch, owned);
        }
        let slot = inner.entries.get_mut(key)?;
        slot.touched = touch;
        Some(slot.value.clone())
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    ///
    /// The entry becomes most recently used, then least recently used
    /// entries are evicted until the cache is within capacity.
    pub fn set(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut guard = self.lock();
        let inner = &mut *guard;

        let touch = inner.next_touch();
        let slot = Slot {
            value,
            expires_at,
            touched: touch,
        };
        if let Some(previous) = inner.entries.insert(key.clone(), slot) {
            inner.recency.remove(&previous.touched);
        }
        inner.recency.insert(touch, key);

        while inner.entries.len() > self.max_size {
            let Some((_, oldest)) = inner.recency.pop_first() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Configured time-to-live.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        // A panic while holding the lock cannot leave a half-written slot.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
