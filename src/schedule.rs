use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime};
use ulid::Ulid;

use crate::model::{Facility, Span, TimeBlock};

#[derive(Debug)]
pub enum ResolveError {
    /// The schedule backend failed (store unreachable, decode error, ...).
    Backend(String),
    /// A configured block has boundaries that don't parse or are inverted.
    MalformedBlock { from: String, to: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Backend(e) => write!(f, "schedule backend error: {e}"),
            ResolveError::MalformedBlock { from, to } => {
                write!(f, "malformed time block [{from}, {to})")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves a facility's availability pattern into the concrete open windows
/// for one date. Implementations may hit the document store, so the call is
/// async; everything downstream of it is pure computation.
///
/// Contract: blocks are sorted ascending, non-overlapping, and each lies
/// within the 24 hours of `date`. A facility with no schedule configured
/// resolves to an empty list: closed all day.
#[async_trait]
pub trait BlockResolver: Send + Sync {
    async fn resolve_open_blocks(
        &self,
        facility: &Facility,
        date: NaiveDate,
    ) -> Result<Vec<TimeBlock>, ResolveError>;
}

/// Parse a wall-clock `"HH:MM"` boundary.
pub fn parse_clock(s: &str) -> chrono::ParseResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
}

/// Materialize a block's wall-clock boundaries into concrete instants on `date`.
pub fn block_span_on(block: &TimeBlock, date: NaiveDate) -> Result<Span, ResolveError> {
    let malformed = || ResolveError::MalformedBlock {
        from: block.from.clone(),
        to: block.to.clone(),
    };
    let from = parse_clock(&block.from).map_err(|_| malformed())?;
    let to = parse_clock(&block.to).map_err(|_| malformed())?;
    if from >= to {
        return Err(malformed());
    }
    Ok(Span::new(date.and_time(from), date.and_time(to)))
}

/// True iff `[start, end)` fits entirely within one block.
/// Blocks with unparsable boundaries are skipped; they can never match.
pub fn is_interval_within_blocks(blocks: &[TimeBlock], start: NaiveTime, end: NaiveTime) -> bool {
    if start >= end {
        return false;
    }
    blocks.iter().any(|b| {
        match (parse_clock(&b.from), parse_clock(&b.to)) {
            (Ok(from), Ok(to)) => from <= start && end <= to,
            _ => {
                tracing::warn!(from = %b.from, to = %b.to, "skipping malformed time block");
                false
            }
        }
    })
}

// ── In-memory reference resolver ─────────────────────────────────

/// A weekly availability pattern: open blocks per weekday, plus date-specific
/// overrides that replace the weekday pattern for that date entirely.
#[derive(Debug, Clone, Default)]
pub struct WeeklySchedule {
    week: HashMap<chrono::Weekday, Vec<TimeBlock>>,
    overrides: HashMap<NaiveDate, Vec<TimeBlock>>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open block to a weekday's pattern.
    pub fn open(mut self, day: chrono::Weekday, from: &str, to: &str) -> Self {
        self.week
            .entry(day)
            .or_default()
            .push(TimeBlock::new(from, to));
        self
    }

    /// Replace the pattern for a single date (e.g. a holiday or event day).
    /// An empty block list closes the facility for that date.
    pub fn override_date(mut self, date: NaiveDate, blocks: Vec<TimeBlock>) -> Self {
        self.overrides.insert(date, blocks);
        self
    }

    pub fn blocks_for(&self, date: NaiveDate) -> Vec<TimeBlock> {
        let mut blocks = self
            .overrides
            .get(&date)
            .or_else(|| self.week.get(&date.weekday()))
            .cloned()
            .unwrap_or_default();
        // Zero-padded "HH:MM" sorts correctly as text.
        blocks.sort_by(|a, b| a.from.cmp(&b.from));
        blocks
    }
}

/// In-memory [`BlockResolver`] keyed by the facility's schedule reference.
/// Reference implementation for tests and embedders; the production resolver
/// is backed by the document store and lives with the persistence layer.
#[derive(Debug, Default)]
pub struct WeeklyScheduleResolver {
    schedules: HashMap<Ulid, WeeklySchedule>,
}

impl WeeklyScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, schedule_id: Ulid, schedule: WeeklySchedule) -> Self {
        self.schedules.insert(schedule_id, schedule);
        self
    }
}

#[async_trait]
impl BlockResolver for WeeklyScheduleResolver {
    async fn resolve_open_blocks(
        &self,
        facility: &Facility,
        date: NaiveDate,
    ) -> Result<Vec<TimeBlock>, ResolveError> {
        let Some(schedule_id) = facility.schedule_id else {
            return Ok(Vec::new());
        };
        Ok(self
            .schedules
            .get(&schedule_id)
            .map(|s| s.blocks_for(date))
            .unwrap_or_default())
    }
}
