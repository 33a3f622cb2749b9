use ulid::Ulid;

use crate::model::{Reservation, Span};

/// All reservations on `facility_id` whose interval overlaps `span`.
///
/// Pure function over the caller-supplied snapshot. Cancelled reservations
/// never occupy; `exclude_id` drops the reservation being moved so it cannot
/// conflict with itself. Both sides are truncated to whole-minute granularity
/// before comparison: sub-second jitter between a client-computed instant
/// and the stored one must never flip the outcome.
///
/// Returns the full overlapping subset rather than a boolean: callers report
/// the count, and the capacity sweep needs the members.
pub fn find_conflicts<'a>(
    facility_id: Ulid,
    span: &Span,
    reservations: &'a [Reservation],
    exclude_id: Option<Ulid>,
) -> Vec<&'a Reservation> {
    let candidate = span.floor_to_minute();
    reservations
        .iter()
        .filter(|r| Some(r.id) != exclude_id)
        .filter(|r| r.facility_id == facility_id)
        .filter(|r| !r.is_cancelled())
        .filter(|r| r.span.floor_to_minute().overlaps(&candidate))
        .collect()
}
