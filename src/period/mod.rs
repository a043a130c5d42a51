//! Period records and the committed period history.
//!
//! The history is the durable source of truth. It is only ever replaced
//! wholesale, either by [`build_history`] at commit time or by validated
//! deserialization of a persisted blob.

mod builder;
mod record;

pub use builder::build_history;
pub use record::PeriodRecord;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::day::Day;
use crate::error::{Error, Result};

/// Ordered, non-overlapping period records.
///
/// Records are sorted ascending by start, and consecutive records are
/// separated by at least one unrecorded day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PeriodRecord>", into = "Vec<PeriodRecord>")]
pub struct PeriodHistory {
    records: Vec<PeriodRecord>,
}

impl PeriodHistory {
    /// Group arbitrary days into a history. See [`build_history`].
    pub fn from_days(days: impl IntoIterator<Item = Day>) -> Self {
        build_history(days)
    }

    /// Wrap records the builder produced in ascending order.
    pub(crate) const fn from_sorted(records: Vec<PeriodRecord>) -> Self {
        Self { records }
    }

    /// Validate externally supplied records and build a history.
    ///
    /// Records are ordered by start first. Overlapping records, records
    /// that touch without a gap day, and repeated ids are rejected rather
    /// than repaired.
    pub fn try_from_records(mut records: Vec<PeriodRecord>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !ids.insert(r.id())) {
            return Err(Error::invalid_history(format!(
                "record id {} appears more than once",
                dup.id()
            )));
        }

        records.sort_by_key(PeriodRecord::start);

        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[1].start().days_since(pair[0].end()) < 2)
        {
            return Err(Error::invalid_history(format!(
                "records {} and {} overlap or touch",
                pair[0].span(),
                pair[1].span()
            )));
        }

        Ok(Self { records })
    }

    /// All records, ascending by start
    #[must_use]
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    /// Iterate records ascending by start
    pub fn iter(&self) -> std::slice::Iter<'_, PeriodRecord> {
        self.records.iter()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest record
    #[must_use]
    pub fn first(&self) -> Option<&PeriodRecord> {
        self.records.first()
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// Every recorded day in ascending order.
    pub fn all_days(&self) -> impl Iterator<Item = Day> + '_ {
        self.records.iter().flat_map(|r| r.days().iter().copied())
    }

    /// Total number of recorded days.
    #[must_use]
    pub fn total_days(&self) -> usize {
        self.records.iter().map(|r| r.days().len()).sum()
    }

    /// The record whose days include `day`.
    #[must_use]
    pub fn record_containing(&self, day: Day) -> Option<&PeriodRecord> {
        let idx = self.records.partition_point(|r| r.start() <= day);
        idx.checked_sub(1)
            .map(|i| &self.records[i])
            .filter(|r| r.contains(day))
    }

    /// The record with the greatest end strictly before `day`.
    #[must_use]
    pub fn nearest_before(&self, day: Day) -> Option<&PeriodRecord> {
        self.position_before(day).map(|i| &self.records[i])
    }

    /// Index of the record with the greatest end strictly before `day`.
    #[must_use]
    pub fn position_before(&self, day: Day) -> Option<usize> {
        // Ends ascend with starts because records never overlap
        self.records.partition_point(|r| r.end() < day).checked_sub(1)
    }

    /// The record with the smallest start strictly after `day`.
    #[must_use]
    pub fn nearest_after(&self, day: Day) -> Option<&PeriodRecord> {
        let idx = self.records.partition_point(|r| r.start() <= day);
        self.records.get(idx)
    }

    /// Whether `index` is the position of the most recent record.
    #[must_use]
    pub fn is_last_position(&self, index: usize) -> bool {
        index + 1 == self.records.len()
    }
}

impl TryFrom<Vec<PeriodRecord>> for PeriodHistory {
    type Error = Error;

    fn try_from(records: Vec<PeriodRecord>) -> Result<Self> {
        Self::try_from_records(records)
    }
}

impl From<PeriodHistory> for Vec<PeriodRecord> {
    fn from(history: PeriodHistory) -> Self {
        history.records
    }
}

impl<'a> IntoIterator for &'a PeriodHistory {
    type Item = &'a PeriodRecord;
    type IntoIter = std::slice::Iter<'a, PeriodRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
