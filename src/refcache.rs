//! Process-wide, read-mostly cache of reference sequence bytes, bounded by
//! a configurable memory footprint and evicted LRU by region. Writers occur
//! only on cache miss/eviction; once a line is inserted it is immutable, so
//! readers holding a cloned `Arc` never block behind a writer touching a
//! different line.
//!
//! Uses `std::sync::RwLock` rather than pulling in a dedicated lock crate,
//! since the only mutation is index bookkeeping on miss, not a hot per-read
//! path (see DESIGN.md for the dependency note).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::scheduler::Region;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    contig: String,
    start: u64,
    end: u64,
}

impl From<&Region> for CacheKey {
    fn from(region: &Region) -> Self {
        CacheKey {
            contig: region.contig.clone(),
            start: region.start,
            end: region.end,
        }
    }
}

struct Entry {
    bases: Arc<Vec<u8>>,
    last_used: u64,
}

struct Inner {
    entries: HashMap<CacheKey, Entry>,
    bytes_used: usize,
    clock: u64,
}

/// Bounded LRU cache of reference sequence bytes by region.
pub struct ReferenceCache {
    cap_bytes: usize,
    inner: RwLock<Inner>,
}

impl ReferenceCache {
    pub fn new(cap_bytes: usize) -> Self {
        ReferenceCache {
            cap_bytes,
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                bytes_used: 0,
                clock: 0,
            }),
        }
    }

    /// Returns the cached bases for `region`, populating the cache via
    /// `load` on a miss. `load` runs outside any lock held by this cache
    /// (only the inner index is briefly locked), so a slow reference read
    /// never blocks other readers hitting the cache.
    pub fn get_or_load(&self, region: &Region, load: impl FnOnce() -> Vec<u8>) -> Arc<Vec<u8>> {
        let key = CacheKey::from(region);

        if let Some(bases) = self.touch(&key) {
            return bases;
        }

        let bases = Arc::new(load());
        self.insert(key, Arc::clone(&bases));
        bases
    }

    fn touch(&self, key: &CacheKey) -> Option<Arc<Vec<u8>>> {
        let mut inner = self.inner.write().expect("reference cache lock poisoned");
        inner.clock += 1;
        let clock = inner.clock;
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = clock;
        Some(Arc::clone(&entry.bases))
    }

    fn insert(&self, key: CacheKey, bases: Arc<Vec<u8>>) {
        let mut inner = self.inner.write().expect("reference cache lock poisoned");
        let size = bases.len();

        while inner.bytes_used + size > self.cap_bytes && !inner.entries.is_empty() {
            let lru_key = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
                .expect("checked non-empty above");
            if let Some(evicted) = inner.entries.remove(&lru_key) {
                inner.bytes_used = inner.bytes_used.saturating_sub(evicted.bases.len());
            }
        }

        inner.clock += 1;
        let clock = inner.clock;
        inner.bytes_used += size;
        inner.entries.insert(key, Entry { bases, last_used: clock });
    }

    pub fn bytes_used(&self) -> usize {
        self.inner.read().expect("reference cache lock poisoned").bytes_used
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("reference cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn region(contig: &str, start: u64, end: u64) -> Region {
        Region::new(contig, 0, start, end)
    }

    #[test]
    fn cache_miss_invokes_loader_once() {
        let cache = ReferenceCache::new(1024);
        let calls = AtomicUsize::new(0);
        let region = region("chr1", 0, 10);

        let first = cache.get_or_load(&region, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![b'A'; 10]
        });
        let second = cache.get_or_load(&region, || {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![b'A'; 10]
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*first, *second);
    }

    #[test]
    fn eviction_is_lru_by_region() {
        let cache = ReferenceCache::new(20);
        let a = region("chr1", 0, 10);
        let b = region("chr1", 10, 20);
        let c = region("chr1", 20, 30);

        cache.get_or_load(&a, || vec![0u8; 10]);
        cache.get_or_load(&b, || vec![0u8; 10]);
        // touch `a` again so `b` becomes the least-recently-used line.
        cache.get_or_load(&a, || panic!("should be a cache hit"));
        cache.get_or_load(&c, || vec![0u8; 10]);

        assert_eq!(cache.len(), 2);
        let mut reload_calls = 0;
        cache.get_or_load(&b, || {
            reload_calls += 1;
            vec![0u8; 10]
        });
        assert_eq!(reload_calls, 1, "b should have been evicted and reloaded");
    }

    #[test]
    fn bytes_used_tracks_cap() {
        let cache = ReferenceCache::new(30);
        for i in 0..5u64 {
            cache.get_or_load(&region("chr1", i * 10, i * 10 + 10), || vec![0u8; 10]);
        }
        assert!(cache.bytes_used() <= 30);
    }
}
