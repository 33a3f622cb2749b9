use chrono::NaiveDateTime;

use crate::model::{CapacityInfo, Reservation};

/// Peak concurrent occupancy across a set of conflicting reservations.
///
/// Summing every conflicting reservation's occupants over-counts when the
/// conflicts don't all overlap each other; counting only the candidate's own
/// addition under-counts when they do. The correct measure is the maximum
/// simultaneous occupancy at any instant, found with a sweep line over
/// start/end events.
///
/// Start events sort before end events at the same instant: a reservation
/// ending exactly when another begins is treated as momentarily co-occupying,
/// the safer assumption for a physical constraint like arena footing or
/// stall space.
pub fn peak_concurrent_occupants(conflicts: &[&Reservation], max_capacity: u32) -> CapacityInfo {
    let mut events: Vec<(NaiveDateTime, i64)> = Vec::with_capacity(conflicts.len() * 2);
    for r in conflicts {
        if r.occupants == 0 {
            continue;
        }
        events.push((r.span.start, r.occupants as i64));
        events.push((r.span.end, -(r.occupants as i64)));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut current: i64 = 0;
    let mut peak: i64 = 0;
    for (_, delta) in &events {
        current += delta;
        peak = peak.max(current);
    }

    let peak = peak as u32;
    CapacityInfo {
        peak_occupants: peak,
        remaining_capacity: max_capacity.saturating_sub(peak),
    }
}
