use std::time::Instant;

use chrono::NaiveDateTime;
use ulid::Ulid;

use crate::model::{Facility, Reservation, Span, ValidationResult};
use crate::observability;
use crate::schedule::{ResolveError, is_interval_within_blocks};

use super::BookingEngine;
use super::capacity::peak_concurrent_occupants;
use super::conflict::find_conflicts;

/// Extension point for per-user or per-period booking allowances.
///
/// Consulted on the move path after all interval checks pass. The default
/// implementation is permissive; a real policy can be injected without
/// changing the validator's shape.
pub trait QuotaPolicy: Send + Sync {
    fn has_quota(&self, reservation: &Reservation, facility: &Facility) -> bool;
}

pub struct UnlimitedQuota;

impl QuotaPolicy for UnlimitedQuota {
    fn has_quota(&self, _reservation: &Reservation, _facility: &Facility) -> bool {
        true
    }
}

impl BookingEngine {
    /// Validate a proposed new booking against a snapshot of reservations.
    ///
    /// A stateless pass: identical inputs yield identical results. Failures
    /// are data, not errors; `Err` only means the schedule seam failed.
    pub async fn validate_new_booking(
        &self,
        facility: &Facility,
        start: NaiveDateTime,
        end: NaiveDateTime,
        reservations: &[Reservation],
    ) -> Result<ValidationResult, ResolveError> {
        let started = Instant::now();
        let result = self
            .run_checks(facility, start, end, reservations, None)
            .await?;
        record(&result, started);
        Ok(result)
    }

    /// Validate moving an existing reservation to a new interval, possibly on
    /// a different facility. The reservation itself is excluded from the
    /// conflict pool; capacity and quota checks are additive on this path.
    pub async fn validate_booking_move(
        &self,
        reservation: &Reservation,
        target: &Facility,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
        reservations: &[Reservation],
    ) -> Result<ValidationResult, ResolveError> {
        let started = Instant::now();
        let mut result = self
            .run_checks(target, new_start, new_end, reservations, Some(reservation.id))
            .await?;

        if result.valid
            && let Some(max) = target.max_concurrent_occupants
        {
            let span = Span::new(new_start, new_end);
            let conflicts = find_conflicts(target.id, &span, reservations, Some(reservation.id));
            let info = peak_concurrent_occupants(&conflicts, max);
            if info.remaining_capacity < reservation.occupants {
                result = ValidationResult::rejected(format!(
                    "facility allows at most {max} concurrent occupants, {} remaining, booking brings {}",
                    info.remaining_capacity, reservation.occupants
                ));
            }
        }
        if result.valid && !self.quota.has_quota(reservation, target) {
            result = ValidationResult::rejected("booking quota exhausted for this period");
        }

        record(&result, started);
        Ok(result)
    }

    /// The shared check sequence. Ordered deliberately so the cheapest and
    /// most informative failures surface first; short-circuits on the first
    /// invalid result.
    async fn run_checks(
        &self,
        facility: &Facility,
        start: NaiveDateTime,
        end: NaiveDateTime,
        reservations: &[Reservation],
        exclude_id: Option<Ulid>,
    ) -> Result<ValidationResult, ResolveError> {
        if start >= end {
            return Ok(ValidationResult::rejected(
                "booking start must be before its end",
            ));
        }

        // Business hours: the whole interval must fit one open block of one
        // calendar day.
        let clock_range = format!(
            "requested time {} to {} is outside business hours",
            start.format("%H:%M"),
            end.format("%H:%M")
        );
        if start.date() != end.date() {
            return Ok(ValidationResult::rejected(clock_range));
        }
        let blocks = self.open_blocks(facility, start.date()).await?;
        if !is_interval_within_blocks(&blocks, start.time(), end.time()) {
            return Ok(ValidationResult::rejected(clock_range));
        }

        // Conflicts. Only the count is reported: a failed probe must not
        // reveal another tenant's schedule.
        let span = Span::new(start, end);
        let conflicts = find_conflicts(facility.id, &span, reservations, exclude_id);
        if !conflicts.is_empty() {
            let n = conflicts.len();
            let plural = if n == 1 { "" } else { "s" };
            return Ok(ValidationResult::rejected(format!(
                "conflicts with {n} existing booking{plural}"
            )));
        }

        let minutes = span.duration().num_minutes();
        if let Some(min) = facility.min_slot_minutes
            && minutes < min
        {
            return Ok(ValidationResult::rejected(format!(
                "booking must be at least {min} minutes"
            )));
        }
        if let Some(max_hours) = facility.max_booking_hours
            && minutes > max_hours * 60
        {
            return Ok(ValidationResult::rejected(format!(
                "booking must not exceed {max_hours} hours"
            )));
        }

        Ok(ValidationResult::ok())
    }
}

fn record(result: &ValidationResult, started: Instant) {
    metrics::counter!(
        observability::VALIDATIONS_TOTAL,
        "outcome" => observability::outcome_label(result)
    )
    .increment(1);
    metrics::histogram!(observability::VALIDATION_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
}
