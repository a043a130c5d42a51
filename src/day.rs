//! The calendar day, the atomic unit of every computation in this crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::DayCount;

/// Storage and CLI date format.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar date with no time-of-day component.
///
/// Wrapping `NaiveDate` makes "already truncated to midnight" a property of
/// the type: there is no way to carry a time of day in a `Day`.
///
/// Days are limited to years 1 through 9999, the range `YYYY-MM-DD` can
/// express. Parsing and deserialization reject anything outside it, and
/// arithmetic saturates at its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct Day(NaiveDate);

/// Earliest supported year
pub const MIN_YEAR: i32 = 1;

/// Latest supported year
pub const MAX_YEAR: i32 = 9999;

impl Day {
    /// Build a day from year, month and day-of-month.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(Self::checked)
    }

    /// First supported day, 0001-01-01.
    #[must_use]
    pub fn min_supported() -> Self {
        Self(NaiveDate::from_ymd_opt(MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN))
    }

    /// Last supported day, 9999-12-31.
    #[must_use]
    pub fn max_supported() -> Self {
        Self(NaiveDate::from_ymd_opt(MAX_YEAR, 12, 31).unwrap_or(NaiveDate::MAX))
    }

    fn checked(date: NaiveDate) -> Option<Self> {
        (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(Self(date))
    }

    /// Today in the local timezone.
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Truncate a zoned timestamp to its calendar day.
    ///
    /// `None` outside the supported year range.
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Option<Self> {
        Self::checked(at.date_naive())
    }

    /// The underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// Shift by a signed number of days, saturating at the supported range.
    #[must_use]
    pub fn add_days(self, days: i64) -> Self {
        let shifted = Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .and_then(Self::checked);
        match shifted {
            Some(day) => day,
            None if days < 0 => Self::min_supported(),
            None => Self::max_supported(),
        }
    }

    /// The following day.
    #[must_use]
    pub fn next(self) -> Self {
        self.add_days(1)
    }

    /// The preceding day.
    #[must_use]
    pub fn previous(self) -> Self {
        self.add_days(-1)
    }

    /// Signed number of days from `earlier` to `self`.
    #[must_use]
    pub fn days_since(self, earlier: Self) -> i64 {
        self.0.signed_duration_since(earlier.0).num_days()
    }

    /// 1-based position of `self` counting from `start`.
    ///
    /// `start` itself is day 1.
    #[must_use]
    pub fn ordinal_from(self, start: Self) -> DayCount {
        DayCount::new(self.days_since(start) + 1)
    }

    /// Integer key used by the membership index.
    #[must_use]
    pub fn epoch_key(self) -> i32 {
        self.0.num_days_from_ce()
    }

    /// Monday of the week containing this day.
    #[must_use]
    pub fn week_start(self) -> Self {
        let offset = i64::from(self.0.weekday().num_days_from_monday());
        self.add_days(-offset)
    }
}

impl TryFrom<NaiveDate> for Day {
    type Error = Error;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::checked(date).ok_or_else(|| Error::InvalidDate {
            input: date.to_string(),
        })
    }
}

impl From<Day> for NaiveDate {
    fn from(day: Day) -> Self {
        day.0
    }
}

impl FromStr for Day {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .ok()
            .and_then(Self::checked)
            .ok_or_else(|| Error::InvalidDate {
                input: s.to_string(),
            })
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}
