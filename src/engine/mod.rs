mod capacity;
mod conflict;
mod slots;
mod validate;

pub use capacity::peak_concurrent_occupants;
pub use conflict::find_conflicts;
pub use slots::{SlotIter, slots_in_blocks};
pub use validate::{QuotaPolicy, UnlimitedQuota};

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::BlockCache;
use crate::model::{Facility, Reservation, TimeBlock};
use crate::observability;
use crate::schedule::{BlockResolver, ResolveError};

/// Booking validation and slot listing over caller-supplied snapshots.
///
/// The engine is advisory: two concurrent requests validated against
/// snapshots taken before the other committed can both come back valid
/// (check-then-act). It may be called speculatively any number of times,
/// for client preview and server-side pre-check alike, but only the persistence
/// layer's transactional re-check at commit time, re-running
/// [`find_conflicts`] (and [`peak_concurrent_occupants`] for
/// capacity-limited facilities) against a fresh read, is authoritative.
///
/// The engine owns no mutable state between calls; the resolver, the
/// optional block cache, and the quota policy are injected seams.
pub struct BookingEngine {
    resolver: Arc<dyn BlockResolver>,
    cache: Option<Arc<BlockCache>>,
    quota: Arc<dyn QuotaPolicy>,
}

impl BookingEngine {
    pub fn new(resolver: Arc<dyn BlockResolver>) -> Self {
        Self {
            resolver,
            cache: None,
            quota: Arc::new(UnlimitedQuota),
        }
    }

    pub fn with_cache(mut self, cache: Arc<BlockCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_quota(mut self, quota: Arc<dyn QuotaPolicy>) -> Self {
        self.quota = quota;
        self
    }

    /// Resolve the open blocks for one facility-day, consulting the injected
    /// cache when configured.
    pub async fn open_blocks(
        &self,
        facility: &Facility,
        date: NaiveDate,
    ) -> Result<Vec<TimeBlock>, ResolveError> {
        if let Some(cache) = &self.cache {
            if let Some(blocks) = cache.get(facility.id, date) {
                metrics::counter!(observability::BLOCK_CACHE_HITS_TOTAL).increment(1);
                return Ok(blocks);
            }
            metrics::counter!(observability::BLOCK_CACHE_MISSES_TOTAL).increment(1);
        }
        let blocks = self.resolver.resolve_open_blocks(facility, date).await?;
        if let Some(cache) = &self.cache {
            cache.put(facility.id, date, blocks.clone());
        }
        Ok(blocks)
    }

    /// All free bookable slots for a facility-day, lazily enumerated.
    pub async fn available_slots<'a>(
        &self,
        facility: &Facility,
        date: NaiveDate,
        reservations: &'a [Reservation],
        slot_minutes: i64,
    ) -> Result<SlotIter<'a>, ResolveError> {
        let blocks = self.open_blocks(facility, date).await?;
        Ok(slots_in_blocks(
            facility.id,
            &blocks,
            date,
            reservations,
            slot_minutes,
        ))
    }
}
