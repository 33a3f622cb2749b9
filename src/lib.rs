//! Facility reservation validation core for stable management.
//!
//! Decides whether a proposed booking (a half-open time interval on a
//! bookable facility) may be created or moved, given business hours,
//! existing reservations, duration limits, and per-slot capacity shared by
//! multiple horses. Also enumerates the free bookable slots of a
//! facility-day.
//!
//! This is a library-level contract invoked by request handlers; it owns no
//! wire format and no persistence. Every decision is advisory: the
//! persistence layer must re-run the same conflict and capacity checks
//! inside a transaction at commit time (see [`engine::BookingEngine`]).

pub mod cache;
pub mod engine;
pub mod model;
pub mod observability;
pub mod schedule;

pub use cache::BlockCache;
pub use engine::{
    BookingEngine, QuotaPolicy, SlotIter, UnlimitedQuota, find_conflicts,
    peak_concurrent_occupants, slots_in_blocks,
};
pub use model::{
    CapacityInfo, Facility, Reservation, ReservationStatus, Slot, Span, TimeBlock,
    ValidationResult,
};
pub use schedule::{
    BlockResolver, ResolveError, WeeklySchedule, WeeklyScheduleResolver,
    is_interval_within_blocks,
};
