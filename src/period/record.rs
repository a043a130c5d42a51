//! A single recorded period.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_range::DayRange;
use crate::day::Day;
use crate::error::{Error, Result};
use crate::types::DayCount;

/// One contiguous run of recorded days.
///
/// Invariants: `days` is non-empty, ascending, deduplicated, and every
/// adjacent pair is exactly one calendar day apart. Records are immutable;
/// a changed history produces new records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord", into = "StoredRecord")]
pub struct PeriodRecord {
    id: Uuid,
    days: Vec<Day>,
    span: DayRange,
}

/// Wire shape of a record: `{ "id": ..., "days": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    id: Uuid,
    days: Vec<Day>,
}

impl PeriodRecord {
    /// Build a record from a run already known to be ascending and contiguous.
    ///
    /// Only the history builder calls this; `run` must be non-empty.
    pub(crate) fn from_run(run: Vec<Day>, first: Day, last: Day) -> Self {
        Self {
            id: Uuid::new_v4(),
            days: run,
            span: DayRange::new(first, last),
        }
    }

    /// Validate externally supplied days and build a record.
    ///
    /// Days are sorted and deduplicated first; a gap anywhere in the result
    /// is rejected.
    pub fn try_new(id: Uuid, mut days: Vec<Day>) -> Result<Self> {
        days.sort_unstable();
        days.dedup();

        let (Some(&first), Some(&last)) = (days.first(), days.last()) else {
            return Err(Error::invalid_record(format!("record {id} has no days")));
        };

        if let Some(pair) = days.windows(2).find(|pair| pair[1].days_since(pair[0]) != 1) {
            return Err(Error::invalid_record(format!(
                "record {id} is not contiguous between {} and {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            id,
            days,
            span: DayRange::new(first, last),
        })
    }

    /// Opaque unique identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Recorded days in ascending order
    #[must_use]
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// First recorded day
    #[must_use]
    pub const fn start(&self) -> Day {
        self.span.start
    }

    /// Last recorded day
    #[must_use]
    pub const fn end(&self) -> Day {
        self.span.end
    }

    /// Number of recorded days
    #[must_use]
    pub fn length(&self) -> DayCount {
        DayCount::from(self.days.len())
    }

    /// The inclusive range covered by this record
    #[must_use]
    pub const fn span(&self) -> DayRange {
        self.span
    }

    /// Whether `day` is one of this record's days.
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.span.contains(day)
    }
}

impl TryFrom<StoredRecord> for PeriodRecord {
    type Error = Error;

    fn try_from(stored: StoredRecord) -> Result<Self> {
        Self::try_new(stored.id, stored.days)
    }
}

impl From<PeriodRecord> for StoredRecord {
    fn from(record: PeriodRecord) -> Self {
        Self {
            id: record.id,
            days: record.days,
        }
    }
}
