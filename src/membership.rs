//! O(1) "is this day recorded" lookups.

use std::collections::HashSet;

use crate::day::Day;
use crate::period::PeriodHistory;

/// Set of integer day keys for every day in a history.
///
/// Always rebuilt in full from a history, never patched. Histories hold at
/// most a few hundred days, so the rebuild is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipIndex {
    keys: HashSet<i32>,
}

impl MembershipIndex {
    /// Index every day of `history`.
    #[must_use]
    pub fn from_history(history: &PeriodHistory) -> Self {
        let mut keys = HashSet::with_capacity(history.total_days());
        keys.extend(history.all_days().map(Day::epoch_key));
        Self { keys }
    }

    /// Whether `day` is recorded.
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.keys.contains(&day.epoch_key())
    }

    /// Number of indexed days
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<&PeriodHistory> for MembershipIndex {
    fn from(history: &PeriodHistory) -> Self {
        Self::from_history(history)
    }
}
