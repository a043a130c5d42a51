//! Classifying arbitrary days relative to the recorded history.

use crate::analytics::NextPeriodPrediction;
use crate::day::Day;
use crate::membership::MembershipIndex;
use crate::period::PeriodHistory;
use crate::types::DayCount;

/// Where a day falls relative to recorded periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedDayStatus {
    /// No history, or earlier than the first recorded period
    BeforeAllPeriods,
    /// Inside a period; `day_number` is 1-based
    InPeriod { day_number: DayCount },
    /// Between periods or after the last one
    AfterPeriod {
        days_since_last_start: DayCount,
        is_most_recent_cycle: bool,
    },
}

impl SelectedDayStatus {
    /// Whether the day is a recorded period day.
    #[must_use]
    pub const fn is_in_period(&self) -> bool {
        matches!(self, Self::InPeriod { .. })
    }
}

/// How a calendar surface should mark a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarMark {
    /// A recorded period day, with its 1-based day number
    Recorded(DayCount),
    /// Inside the predicted next period
    Predicted,
    Unmarked,
}

/// Classifies days against one history and its membership index.
#[derive(Debug, Clone, Copy)]
pub struct DayStatusClassifier<'a> {
    history: &'a PeriodHistory,
    index: &'a MembershipIndex,
}

impl<'a> DayStatusClassifier<'a> {
    /// `index` must have been built from `history`.
    #[must_use]
    pub const fn new(history: &'a PeriodHistory, index: &'a MembershipIndex) -> Self {
        Self { history, index }
    }

    /// Classify `day`.
    #[must_use]
    pub fn classify(&self, day: Day) -> SelectedDayStatus {
        let Some(first) = self.history.first() else {
            return SelectedDayStatus::BeforeAllPeriods;
        };

        if self.index.contains(day) {
            if let Some(record) = self.history.record_containing(day) {
                return SelectedDayStatus::InPeriod {
                    day_number: day.ordinal_from(record.start()),
                };
            }
        }

        if day < first.start() {
            return SelectedDayStatus::BeforeAllPeriods;
        }

        match self.history.position_before(day) {
            Some(index) => SelectedDayStatus::AfterPeriod {
                days_since_last_start: day.ordinal_from(self.history.records()[index].start()),
                is_most_recent_cycle: self.history.is_last_position(index),
            },
            None => SelectedDayStatus::BeforeAllPeriods,
        }
    }

    /// Mark `day` for a calendar, given the current prediction.
    #[must_use]
    pub fn calendar_mark(&self, day: Day, prediction: Option<&NextPeriodPrediction>) -> CalendarMark {
        match self.classify(day) {
            SelectedDayStatus::InPeriod { day_number } => CalendarMark::Recorded(day_number),
            _ if prediction.is_some_and(|p| p.span.contains(day)) => CalendarMark::Predicted,
            _ => CalendarMark::Unmarked,
        }
    }
}
