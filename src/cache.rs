use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::TimeBlock;

struct CacheEntry {
    stored_at: Instant,
    blocks: Vec<TimeBlock>,
}

/// Explicit TTL cache for resolved time blocks, injected into the engine.
///
/// The validator itself stays pure: nothing here is module-level state, and
/// an embedder that skips the cache gets identical results. Handlers that
/// mutate a facility's schedule call [`BlockCache::invalidate`] (or
/// [`BlockCache::invalidate_facility`]) after the write commits.
pub struct BlockCache {
    entries: DashMap<(Ulid, NaiveDate), CacheEntry>,
    ttl: Duration,
}

impl BlockCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached blocks for `(facility, date)` if still fresh.
    /// Stale entries are dropped on access.
    pub fn get(&self, facility: Ulid, date: NaiveDate) -> Option<Vec<TimeBlock>> {
        let key = (facility, date);
        if let Some(entry) = self.entries.get(&key)
            && entry.stored_at.elapsed() < self.ttl
        {
            return Some(entry.blocks.clone());
        }
        self.entries
            .remove_if(&key, |_, e| e.stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn put(&self, facility: Ulid, date: NaiveDate, blocks: Vec<TimeBlock>) {
        self.entries.insert(
            (facility, date),
            CacheEntry {
                stored_at: Instant::now(),
                blocks,
            },
        );
    }

    pub fn invalidate(&self, facility: Ulid, date: NaiveDate) {
        self.entries.remove(&(facility, date));
    }

    /// Drop every cached date for a facility (schedule pattern changed).
    pub fn invalidate_facility(&self, facility: Ulid) {
        self.entries.retain(|(f, _), _| *f != facility);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
