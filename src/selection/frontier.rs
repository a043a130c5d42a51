//! The day after each period, tappable to extend it by one day.

use std::collections::BTreeSet;

use crate::day::Day;
use crate::period::PeriodHistory;

/// For every record in an implied history, the day right after its end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFrontier {
    days: BTreeSet<Day>,
}

impl ExtensionFrontier {
    /// Compute the frontier of `implied`.
    #[must_use]
    pub fn of(implied: &PeriodHistory) -> Self {
        Self {
            days: implied.iter().map(|r| r.end().next()).collect(),
        }
    }

    /// Whether `day` extends some period.
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.days.contains(&day)
    }

    /// Extendable days in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.iter().copied()
    }

    /// Number of extendable days
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether there are no periods to extend
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Day {
        Day::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_one_day_per_record() {
        let implied = PeriodHistory::from_days([
            day(2024, 1, 1),
            day(2024, 1, 2),
            day(2024, 1, 20),
            day(2024, 1, 31),
        ]);
        let frontier = ExtensionFrontier::of(&implied);

        assert_eq!(
            frontier.iter().collect::<Vec<_>>(),
            vec![day(2024, 1, 3), day(2024, 1, 21), day(2024, 2, 1)]
        );
        assert!(frontier.contains(day(2024, 2, 1)));
        assert!(!frontier.contains(day(2024, 1, 2)));
    }

    #[test]
    fn test_empty_history_has_no_frontier() {
        assert!(ExtensionFrontier::of(&PeriodHistory::default()).is_empty());
    }
}
