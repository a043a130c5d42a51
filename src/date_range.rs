//! Inclusive day ranges.
//!
//! A `DayRange` is the span shape shared by period records, predictions,
//! legacy records and the visible week window.

use std::fmt;

use crate::day::Day;
use crate::types::DayCount;

/// Number of days in the visible week window.
pub const DAYS_PER_WEEK: i64 = 7;

/// An inclusive span of calendar days.
///
/// `start <= end` always holds; the constructors order their arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayRange {
    /// First day (inclusive)
    pub start: Day,
    /// Last day (inclusive)
    pub end: Day,
}

impl DayRange {
    /// Create a range between two days in either order.
    #[must_use]
    pub fn new(a: Day, b: Day) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A range covering a single day.
    #[must_use]
    pub const fn single(day: Day) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// A range of `length` days beginning at `start`.
    ///
    /// Lengths below one are treated as one.
    #[must_use]
    pub fn starting_at(start: Day, length: DayCount) -> Self {
        let extra = length.get().max(1) - 1;
        Self {
            start,
            end: start.add_days(extra),
        }
    }

    /// The Monday-start week containing `day`.
    #[must_use]
    pub fn week_containing(day: Day) -> Self {
        Self::starting_at(day.week_start(), DayCount::new(DAYS_PER_WEEK))
    }

    /// Number of days in the range.
    #[must_use]
    pub fn len(&self) -> DayCount {
        DayCount::new(self.end.days_since(self.start) + 1)
    }

    /// Ranges always hold at least one day.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `day` falls inside the range.
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    /// Iterate every day in ascending order.
    pub fn days(&self) -> impl Iterator<Item = Day> {
        let start = self.start;
        (0..self.len().get()).map(move |offset| start.add_days(offset))
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}
