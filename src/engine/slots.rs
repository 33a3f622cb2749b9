use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use ulid::Ulid;

use crate::model::{Reservation, Slot, Span, TimeBlock};
use crate::observability;
use crate::schedule::block_span_on;

use super::conflict::find_conflicts;

/// Lazy, finite iterator over the free bookable slots of one facility-day.
///
/// Recomputed fresh on every call; holds no cached state, so re-running the
/// listing with an updated reservation snapshot is just another call. Slots
/// step on a fixed grid from each block's open time and never span two
/// blocks.
pub struct SlotIter<'a> {
    facility_id: Ulid,
    reservations: &'a [Reservation],
    step: TimeDelta,
    blocks: std::vec::IntoIter<Span>,
    current: Option<(Span, NaiveDateTime)>,
}

/// Enumerate free slots inside already-resolved blocks.
///
/// A block whose boundaries fail to parse is logged and skipped; one broken
/// configuration row must not take down slot listing for the rest of the day.
pub fn slots_in_blocks<'a>(
    facility_id: Ulid,
    blocks: &[TimeBlock],
    date: NaiveDate,
    reservations: &'a [Reservation],
    slot_minutes: i64,
) -> SlotIter<'a> {
    let mut spans = Vec::new();
    if slot_minutes <= 0 {
        tracing::warn!(slot_minutes, "non-positive slot duration, listing no slots");
    } else {
        for block in blocks {
            match block_span_on(block, date) {
                Ok(span) => spans.push(span),
                Err(e) => {
                    metrics::counter!(observability::MALFORMED_BLOCKS_TOTAL).increment(1);
                    tracing::warn!(error = %e, %date, "skipping malformed time block");
                }
            }
        }
    }
    SlotIter {
        facility_id,
        reservations,
        step: TimeDelta::minutes(slot_minutes.max(0)),
        blocks: spans.into_iter(),
        current: None,
    }
}

impl<'a> Iterator for SlotIter<'a> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        loop {
            let (block, cursor) = match self.current {
                Some(c) => c,
                None => {
                    let block = self.blocks.next()?;
                    (block, block.start)
                }
            };
            let end = cursor + self.step;
            if end > block.end {
                self.current = None;
                continue;
            }
            self.current = Some((block, end));
            let slot = Span::new(cursor, end);
            if find_conflicts(self.facility_id, &slot, self.reservations, None).is_empty() {
                return Some(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn reservation(facility_id: Ulid, start: NaiveDateTime, end: NaiveDateTime) -> Reservation {
        Reservation {
            id: Ulid::new(),
            facility_id,
            span: Span::new(start, end),
            status: ReservationStatus::Confirmed,
            occupants: 1,
        }
    }

    #[test]
    fn slots_fill_an_empty_block() {
        let blocks = vec![TimeBlock::new("08:00", "10:00")];
        let slots: Vec<Slot> = slots_in_blocks(Ulid::new(), &blocks, date(), &[], 60).collect();
        assert_eq!(slots, vec![
            Span::new(at(8, 0), at(9, 0)),
            Span::new(at(9, 0), at(10, 0)),
        ]);
    }

    #[test]
    fn every_slot_has_exact_duration_and_containment() {
        let blocks = vec![TimeBlock::new("08:00", "18:00")];
        let block_span = Span::new(at(8, 0), at(18, 0));
        for slot in slots_in_blocks(Ulid::new(), &blocks, date(), &[], 45) {
            assert_eq!(slot.duration().num_minutes(), 45);
            assert!(block_span.contains_span(&slot));
        }
    }

    #[test]
    fn partial_tail_is_not_emitted() {
        let blocks = vec![TimeBlock::new("08:00", "09:30")];
        let slots: Vec<Slot> = slots_in_blocks(Ulid::new(), &blocks, date(), &[], 60).collect();
        assert_eq!(slots, vec![Span::new(at(8, 0), at(9, 0))]);
    }

    #[test]
    fn booked_slot_is_skipped_grid_stays_anchored() {
        let facility = Ulid::new();
        let blocks = vec![TimeBlock::new("08:00", "12:00")];
        let pool = vec![reservation(facility, at(8, 30), at(9, 0))];
        let slots: Vec<Slot> = slots_in_blocks(facility, &blocks, date(), &pool, 60).collect();
        assert_eq!(slots, vec![
            Span::new(at(9, 0), at(10, 0)),
            Span::new(at(10, 0), at(11, 0)),
            Span::new(at(11, 0), at(12, 0)),
        ]);
    }

    #[test]
    fn other_facility_bookings_do_not_block_slots() {
        let facility = Ulid::new();
        let blocks = vec![TimeBlock::new("08:00", "09:00")];
        let pool = vec![reservation(Ulid::new(), at(8, 0), at(9, 0))];
        let slots: Vec<Slot> = slots_in_blocks(facility, &blocks, date(), &pool, 60).collect();
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn malformed_block_skipped_rest_of_day_survives() {
        let blocks = vec![
            TimeBlock::new("8am", "noon"),
            TimeBlock::new("13:00", "15:00"),
        ];
        let slots: Vec<Slot> = slots_in_blocks(Ulid::new(), &blocks, date(), &[], 60).collect();
        assert_eq!(slots, vec![
            Span::new(at(13, 0), at(14, 0)),
            Span::new(at(14, 0), at(15, 0)),
        ]);
    }

    #[test]
    fn slots_never_span_blocks() {
        let blocks = vec![
            TimeBlock::new("08:00", "09:00"),
            TimeBlock::new("09:00", "10:00"),
        ];
        let slots: Vec<Slot> = slots_in_blocks(Ulid::new(), &blocks, date(), &[], 90).collect();
        assert!(slots.is_empty());
    }

    #[test]
    fn listing_is_restartable() {
        let facility = Ulid::new();
        let blocks = vec![TimeBlock::new("08:00", "11:00")];
        let pool = vec![reservation(facility, at(9, 0), at(10, 0))];
        let first: Vec<Slot> = slots_in_blocks(facility, &blocks, date(), &pool, 60).collect();
        let second: Vec<Slot> = slots_in_blocks(facility, &blocks, date(), &pool, 60).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn non_positive_duration_lists_nothing() {
        let blocks = vec![TimeBlock::new("08:00", "18:00")];
        assert_eq!(slots_in_blocks(Ulid::new(), &blocks, date(), &[], 0).count(), 0);
        assert_eq!(slots_in_blocks(Ulid::new(), &blocks, date(), &[], -15).count(), 0);
    }
}
