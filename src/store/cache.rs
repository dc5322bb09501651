//! Bounded FIFO cache tier in front of a slower store.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::store::TargetStore;
use crate::target::Target;

/// Insertion-ordered cache: the oldest-loaded entry is evicted first,
/// regardless of how often it is read.
///
/// Insertion is strict: an id already cached has its value replaced in place
/// and keeps its queue slot, so the queue and the map always hold the same ids.
#[derive(Debug)]
pub struct FifoCache {
    /// Maximum number of entries. Zero disables caching.
    capacity: usize,
    /// Cached targets keyed by id.
    entries: FxHashMap<String, Arc<Target>>,
    /// Ids in insertion order, oldest at the front.
    queue: VecDeque<String>,
}

impl FifoCache {
    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        return self.capacity;
    }

    /// Whether `id` is cached.
    pub fn contains(&self, id: &str) -> bool {
        return self.entries.contains_key(id);
    }

    /// The cached target for `id`. Reads do not affect eviction order.
    pub fn get(&self, id: &str) -> Option<Arc<Target>> {
        return self.entries.get(id).cloned();
    }

    /// Cache `target` under `id`, evicting the oldest entry when full.
    pub fn insert(&mut self, id: &str, target: Arc<Target>) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.entries.get_mut(id) {
            *slot = target;
            return;
        }
        while self.queue.len() >= self.capacity {
            let Some(oldest) = self.queue.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::trace!(id = %oldest, "evicted from cache");
        }
        self.queue.push_back(id.to_string());
        self.entries.insert(id.to_string(), target);
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Create an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        return Self {
            capacity,
            entries: FxHashMap::default(),
            queue: VecDeque::with_capacity(capacity.min(1024)),
        };
    }

    /// Drop every entry.
    pub fn purge(&mut self) {
        self.entries.clear();
        self.queue.clear();
    }
}

/// A store fronted by a [`FifoCache`]. Lookups consult the cache first and
/// populate it on a hit in the inner store.
///
/// The cache is not synchronized; confine a `CachedTargetStore` to one thread.
pub struct CachedTargetStore<S> {
    /// Cache tier, filled through shared lookups.
    cache: RefCell<FifoCache>,
    /// Backing store.
    inner: S,
}

impl<S: TargetStore> CachedTargetStore<S> {
    /// The backing store.
    pub const fn inner(&self) -> &S {
        return &self.inner;
    }

    /// Unwrap the backing store, discarding the cache.
    pub fn into_inner(self) -> S {
        return self.inner;
    }

    /// Whether `id` is currently held by the cache tier.
    pub fn is_cached(&self, id: &str) -> bool {
        return self.cache.borrow().contains(id);
    }

    /// Front `inner` with a cache of `capacity` entries.
    pub fn new(inner: S, capacity: usize) -> Self {
        return Self {
            cache: RefCell::new(FifoCache::new(capacity)),
            inner,
        };
    }
}

impl<S: TargetStore> TargetStore for CachedTargetStore<S> {
    fn add(&mut self, target: Target) -> Result<(), Error> {
        let target = Arc::new(target);
        self.inner.add(Target::clone(&target))?;
        let id = target.id().to_string();
        self.cache.get_mut().insert(&id, target);
        return Ok(());
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.cache.get_mut().purge();
        return self.inner.clear();
    }

    fn contains(&self, id: &str) -> bool {
        return self.is_cached(id) || self.inner.contains(id);
    }

    fn count(&self) -> usize {
        return self.inner.count();
    }

    fn get(&self, id: &str) -> Option<Arc<Target>> {
        if let Some(hit) = self.cache.borrow().get(id) {
            return Some(hit);
        }
        let loaded = self.inner.get(id)?;
        self.cache.borrow_mut().insert(id, Arc::clone(&loaded));
        return Some(loaded);
    }
}
