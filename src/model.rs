use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use ulid::Ulid;

/// Half-open interval `[start, end)` in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Span {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Both boundaries truncated to whole-minute granularity.
    ///
    /// Client-computed and stored instants can disagree below the minute;
    /// interval comparisons always run on the truncated form so that two
    /// instants denoting the same minute never diverge. Truncation may
    /// collapse a sub-minute span to an empty one, so this bypasses the
    /// `start < end` assertion in [`Span::new`].
    pub fn floor_to_minute(&self) -> Span {
        Span {
            start: floor_minute(self.start),
            end: floor_minute(self.end),
        }
    }
}

fn floor_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// A concrete, date-resolved open window with wall-clock `"HH:MM"` boundaries.
///
/// Boundaries stay as raw strings: schedule configuration is tenant-edited
/// data, and a malformed entry must degrade gracefully at the point of use
/// instead of failing the whole resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub from: String,
    pub to: String,
}

impl TimeBlock {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A bookable slot produced by the slot generator.
pub type Slot = Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// An interval occupying a facility.
///
/// Cancellation is the terminal state: the interval is retained for history
/// views but no longer occupies the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub facility_id: Ulid,
    #[serde(flatten)]
    pub span: Span,
    pub status: ReservationStatus,
    /// Number of physical units (horses) this reservation places into the
    /// facility simultaneously.
    #[serde(default, alias = "horses", deserialize_with = "occupants_from_links")]
    pub occupants: u32,
}

impl Reservation {
    /// Decode a reservation from a raw document-store value.
    ///
    /// The horse-linking field in stored documents may be absent, a single
    /// id, a list of ids, or an already-normalized count; all four forms
    /// collapse to one non-negative occupant count here, at the boundary.
    pub fn from_document(doc: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(doc)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ReservationStatus::Cancelled
    }
}

fn occupants_from_links<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Links {
        Count(u32),
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Links>::deserialize(de)? {
        None => 0,
        Some(Links::Count(n)) => n,
        Some(Links::One(_)) => 1,
        Some(Links::Many(ids)) => ids.len() as u32,
    })
}

/// A bookable physical resource (arena, stall, paddock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: Ulid,
    pub name: Option<String>,
    /// Availability pattern reference resolved by the schedule seam.
    /// `None` means no schedule configured: closed all day.
    pub schedule_id: Option<Ulid>,
    pub min_slot_minutes: Option<i64>,
    pub max_booking_hours: Option<i64>,
    /// Max concurrent occupants across overlapping reservations.
    /// `None` = unlimited.
    pub max_concurrent_occupants: Option<u32>,
}

impl Facility {
    pub fn new(id: Ulid) -> Self {
        Self {
            id,
            name: None,
            schedule_id: None,
            min_slot_minutes: None,
            max_booking_hours: None,
            max_concurrent_occupants: None,
        }
    }
}

/// Outcome of a validation pass. `error` is set iff `valid` is false;
/// the constructors are the only way these fields are populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn ok_with_warnings(warnings: Vec<String>) -> Self {
        Self {
            valid: true,
            error: None,
            warnings,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            warnings: Vec::new(),
        }
    }
}

/// Result of a capacity sweep over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityInfo {
    pub peak_occupants: u32,
    pub remaining_capacity: u32,
}
