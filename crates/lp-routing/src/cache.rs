//! Memoized segment lookups.
//!
//! Segment structure (nodes, lanes, endpoint pairing) changes only when the
//! network is rebuilt, so the cost model asks the provider once per segment
//! and shares the answer between every worker.  Live lane usage is *not*
//! taken from here; see [`CostModel`](crate::CostModel).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use lp_core::SegmentId;
use lp_network::{NetworkProvider, Segment};

/// Hit/miss counters since the last [`SegmentCache::clear`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:   u64,
    pub misses: u64,
}

/// Process-wide segment cache shared by every search of a service.
#[derive(Debug, Default)]
pub struct SegmentCache {
    segments: RwLock<FxHashMap<SegmentId, Arc<Segment>>>,
    hits:     AtomicU64,
    misses:   AtomicU64,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached segment, fetching it from `provider` on first use.
    ///
    /// The lock is never held across the provider call.  Two threads missing
    /// on the same id may both fetch; the first insert wins.  Unknown
    /// segments are not cached.
    pub fn get_or_fetch(&self, id: SegmentId, provider: &dyn NetworkProvider) -> Option<Arc<Segment>> {
        if let Some(seg) = self.segments.read().get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(seg));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = Arc::new(provider.segment(id)?);
        let mut map = self.segments.write();
        Some(Arc::clone(map.entry(id).or_insert(fetched)))
    }

    /// Drop every cached segment.
    pub fn clear(&self) {
        self.segments.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.segments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits:   self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
