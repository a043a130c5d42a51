//! Auto-prediction: expanding a single tap into a full period.

use crate::config::PredictionConfig;
use crate::date_range::DayRange;
use crate::day::Day;
use crate::period::PeriodHistory;
use crate::types::DayCount;

/// What a tap on an unselected, non-extendable day adds to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    /// Only the tapped day
    SingleDay(Day),
    /// The tapped day plus the rest of a default-length period
    Expanded(DayRange),
}

impl Prediction {
    /// The days to merge into the draft.
    pub fn days(&self) -> impl Iterator<Item = Day> {
        let range = match *self {
            Self::SingleDay(day) => DayRange::single(day),
            Self::Expanded(range) => range,
        };
        range.days()
    }

    /// Whether the tap was expanded.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded(_))
    }
}

/// Decides whether a tapped day is isolated enough to auto-expand.
///
/// Expansion requires clearance on both sides of the tapped day within the
/// draft's implied history: at least `min_gap_to_next` days until the next
/// period starts, and at least `min_gap_from_previous` days since the
/// previous period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPredictionPolicy {
    pub default_period_length: DayCount,
    pub min_gap_to_next: i64,
    pub min_gap_from_previous: i64,
}

impl Default for AutoPredictionPolicy {
    fn default() -> Self {
        Self::from(&PredictionConfig::default())
    }
}

impl From<&PredictionConfig> for AutoPredictionPolicy {
    fn from(config: &PredictionConfig) -> Self {
        Self {
            default_period_length: config.default_period_length(),
            min_gap_to_next: config.min_gap_to_next,
            min_gap_from_previous: config.min_gap_from_previous,
        }
    }
}

impl AutoPredictionPolicy {
    /// No period starts within `min_gap_to_next` days after `day`.
    #[must_use]
    pub fn forward_clearance(&self, day: Day, implied: &PeriodHistory) -> bool {
        implied
            .nearest_after(day)
            .is_none_or(|next| next.start().days_since(day) >= self.min_gap_to_next)
    }

    /// No period ended within `min_gap_from_previous` days before `day`.
    #[must_use]
    pub fn backward_clearance(&self, day: Day, implied: &PeriodHistory) -> bool {
        implied
            .nearest_before(day)
            .is_none_or(|prev| day.days_since(prev.end()) >= self.min_gap_from_previous)
    }

    /// Decide what tapping `day` adds, given the draft's implied history.
    #[must_use]
    pub fn decide(&self, day: Day, implied: &PeriodHistory) -> Prediction {
        if self.forward_clearance(day, implied) && self.backward_clearance(day, implied) {
            Prediction::Expanded(DayRange::starting_at(day, self.default_period_length))
        } else {
            Prediction::SingleDay(day)
        }
    }
}
