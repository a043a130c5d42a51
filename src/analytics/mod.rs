//! Cycle and period-length statistics
//!
//! Derived, read-only views over a committed history: completed cycles, the
//! projection of the cycle in progress, period-length summaries and the
//! next-period prediction. Every function here is pure and takes the history
//! and "today" explicitly.

use crate::config::PredictionConfig;
use crate::date_range::DayRange;
use crate::day::Day;
use crate::period::{PeriodHistory, PeriodRecord};
use crate::types::DayCount;

/// Cycle length assumed when fewer than two periods are recorded.
pub const FALLBACK_CYCLE_LENGTH: DayCount = DayCount::new(28);

/// A finished cycle: one period start to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub period_start: Day,
    pub period_end: Day,
    pub next_period_start: Day,
    pub cycle_length: DayCount,
    pub period_length: DayCount,
}

impl CycleSummary {
    /// Last day of the cycle (the day before the next period).
    #[must_use]
    pub fn cycle_end(&self) -> Day {
        self.next_period_start.previous()
    }
}

/// The cycle in progress, started by the most recent period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCycleProjection {
    pub cycle_start: Day,
    pub projected_length: DayCount,
    pub projected_end: Day,
    pub elapsed_days: DayCount,
}

/// One recorded period, for period-length views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSummary {
    pub start: Day,
    pub end: Day,
    pub length: DayCount,
}

impl From<&PeriodRecord> for PeriodSummary {
    fn from(record: &PeriodRecord) -> Self {
        Self {
            start: record.start(),
            end: record.end(),
            length: record.length(),
        }
    }
}

/// The next expected period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPeriodPrediction {
    pub span: DayRange,
}

/// Snapshot of every cycle statistic for one history and one "today".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStatistics {
    pub completed_cycles: Vec<CycleSummary>,
    pub average_cycle_length: Option<DayCount>,
    pub current_cycle: Option<CurrentCycleProjection>,
    pub max_cycle_length_seen: DayCount,
}

impl CycleStatistics {
    /// Compute every statistic at once.
    #[must_use]
    pub fn compute(history: &PeriodHistory, today: Day, fallback_cycle_length: DayCount) -> Self {
        let completed_cycles = completed_cycles(history);
        let average_cycle_length = average_of(&completed_cycles);
        let current_cycle = project_current_cycle(
            history,
            today,
            average_cycle_length.unwrap_or(fallback_cycle_length),
        );
        let max_cycle_length_seen =
            max_seen(&completed_cycles, current_cycle.as_ref(), fallback_cycle_length);

        Self {
            completed_cycles,
            average_cycle_length,
            current_cycle,
            max_cycle_length_seen,
        }
    }
}

/// Period-length summaries and their aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodLengthStats {
    pub periods: Vec<PeriodSummary>,
    pub average_period_length: Option<DayCount>,
    pub max_period_length_seen: DayCount,
}

impl PeriodLengthStats {
    /// Summarize every period; `default_length` floors the maximum.
    #[must_use]
    pub fn compute(history: &PeriodHistory, default_length: DayCount) -> Self {
        let periods: Vec<PeriodSummary> = history.iter().map(PeriodSummary::from).collect();
        let average_period_length = DayCount::floor_mean(periods.iter().map(|p| p.length));
        let max_period_length_seen = periods
            .iter()
            .map(|p| p.length)
            .fold(default_length, DayCount::max);

        Self {
            periods,
            average_period_length,
            max_period_length_seen,
        }
    }
}

/// One summary per adjacent pair of records.
#[must_use]
pub fn completed_cycles(history: &PeriodHistory) -> Vec<CycleSummary> {
    history
        .records()
        .windows(2)
        .map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            CycleSummary {
                period_start: current.start(),
                period_end: current.end(),
                next_period_start: next.start(),
                cycle_length: DayCount::new(next.start().days_since(current.start())),
                period_length: current.length(),
            }
        })
        .collect()
}

/// Integer mean cycle length; `None` with fewer than two records.
#[must_use]
pub fn average_cycle_length(history: &PeriodHistory) -> Option<DayCount> {
    average_of(&completed_cycles(history))
}

/// Project the cycle started by the most recent record.
///
/// Uses the average cycle length, or `fallback` when there is none.
/// `None` for an empty history.
#[must_use]
pub fn current_cycle_projection(
    history: &PeriodHistory,
    today: Day,
    fallback: DayCount,
) -> Option<CurrentCycleProjection> {
    let projected_length = average_cycle_length(history).unwrap_or(fallback);
    project_current_cycle(history, today, projected_length)
}

/// Longest cycle worth drawing: completed cycles, the current cycle so far,
/// and never less than the fallback cycle length.
#[must_use]
pub fn max_cycle_length_seen(history: &PeriodHistory, today: Day, fallback: DayCount) -> DayCount {
    let cycles = completed_cycles(history);
    let current = project_current_cycle(history, today, average_of(&cycles).unwrap_or(fallback));
    max_seen(&cycles, current.as_ref(), fallback)
}

/// Predict the next period from the most recent record.
///
/// The start is one average cycle (or the fallback) after the last start;
/// the length is the average period length (or the default). Predictions
/// starting more than `prediction_days_ahead` after today are dropped.
#[must_use]
pub fn predict_next_period(
    history: &PeriodHistory,
    today: Day,
    config: &PredictionConfig,
) -> Option<NextPeriodPrediction> {
    if !config.show_prediction {
        return None;
    }
    let last = history.last()?;

    let cycle_length = average_cycle_length(history).unwrap_or_else(|| config.fallback_cycle_length());
    let period_length = PeriodLengthStats::compute(history, config.default_period_length())
        .average_period_length
        .unwrap_or_else(|| config.default_period_length());

    let start = last.start().add_days(cycle_length.get());
    if start.days_since(today) > config.prediction_days_ahead {
        return None;
    }

    Some(NextPeriodPrediction {
        span: DayRange::starting_at(start, period_length),
    })
}

fn average_of(cycles: &[CycleSummary]) -> Option<DayCount> {
    DayCount::floor_mean(cycles.iter().map(|c| c.cycle_length))
}

fn project_current_cycle(
    history: &PeriodHistory,
    today: Day,
    projected_length: DayCount,
) -> Option<CurrentCycleProjection> {
    let cycle_start = history.last()?.start();
    Some(CurrentCycleProjection {
        cycle_start,
        projected_length,
        projected_end: cycle_start.add_days(projected_length.get() - 1),
        elapsed_days: today.ordinal_from(cycle_start),
    })
}

fn max_seen(
    cycles: &[CycleSummary],
    current: Option<&CurrentCycleProjection>,
    floor: DayCount,
) -> DayCount {
    cycles
        .iter()
        .map(|c| c.cycle_length)
        .chain(current.map(|c| c.elapsed_days))
        .fold(floor, DayCount::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Day {
        Day::from_ymd(y, m, d).unwrap()
    }

    /// Periods starting on each given day, `length` days long.
    fn history_from_starts(starts: &[Day], length: i64) -> PeriodHistory {
        PeriodHistory::from_days(
            starts
                .iter()
                .flat_map(|s| DayRange::starting_at(*s, DayCount::new(length)).days()),
        )
    }

    #[test]
    fn test_completed_cycles() {
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 27)], 5);
        let cycles = completed_cycles(&history);

        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].cycle_length, DayCount::new(28));
        assert_eq!(cycles[0].period_length, DayCount::new(5));
        assert_eq!(cycles[0].period_end, day(2024, 1, 5));
        assert_eq!(cycles[0].next_period_start, day(2024, 1, 29));
        assert_eq!(cycles[0].cycle_end(), day(2024, 1, 28));
        assert_eq!(cycles[1].cycle_length, DayCount::new(29));
    }

    #[test]
    fn test_average_cycle_length_is_floor_mean() {
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 27)], 5);
        assert_eq!(average_cycle_length(&history), Some(DayCount::new(28)));
    }

    #[test]
    fn test_average_undefined_below_two_records() {
        assert_eq!(average_cycle_length(&PeriodHistory::default()), None);
        let single = history_from_starts(&[day(2024, 1, 1)], 5);
        assert_eq!(average_cycle_length(&single), None);
    }

    #[test]
    fn test_current_cycle_projection_uses_fallback() {
        let history = history_from_starts(&[day(2024, 1, 1)], 5);
        let projection =
            current_cycle_projection(&history, day(2024, 1, 10), FALLBACK_CYCLE_LENGTH).unwrap();

        assert_eq!(projection.cycle_start, day(2024, 1, 1));
        assert_eq!(projection.projected_length, DayCount::new(28));
        assert_eq!(projection.projected_end, day(2024, 1, 28));
        assert_eq!(projection.elapsed_days, DayCount::new(10));
    }

    #[test]
    fn test_current_cycle_projection_uses_average() {
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 2, 1)], 5);
        let projection =
            current_cycle_projection(&history, day(2024, 2, 1), FALLBACK_CYCLE_LENGTH).unwrap();

        assert_eq!(projection.cycle_start, day(2024, 2, 1));
        assert_eq!(projection.projected_length, DayCount::new(31));
        assert_eq!(projection.projected_end, day(2024, 3, 2));
        assert_eq!(projection.elapsed_days, DayCount::new(1));
    }

    #[test]
    fn test_current_cycle_projection_empty_history() {
        assert!(current_cycle_projection(&PeriodHistory::default(), day(2024, 1, 1), FALLBACK_CYCLE_LENGTH)
            .is_none());
    }

    #[test]
    fn test_max_cycle_length_seen() {
        // Never below the fallback
        assert_eq!(
            max_cycle_length_seen(&PeriodHistory::default(), day(2024, 1, 1), FALLBACK_CYCLE_LENGTH),
            DayCount::new(28)
        );

        // A long completed cycle wins
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 2, 5)], 5);
        assert_eq!(
            max_cycle_length_seen(&history, day(2024, 2, 10), FALLBACK_CYCLE_LENGTH),
            DayCount::new(35)
        );

        // An overdue current cycle wins
        assert_eq!(
            max_cycle_length_seen(&history, day(2024, 3, 20), FALLBACK_CYCLE_LENGTH),
            DayCount::new(45)
        );
    }

    #[test]
    fn test_max_cycle_length_seen_uses_configured_fallback() {
        let fallback = DayCount::new(35);
        assert_eq!(
            max_cycle_length_seen(&PeriodHistory::default(), day(2024, 1, 1), fallback),
            fallback
        );

        let history = history_from_starts(&[day(2024, 1, 1)], 5);
        let today = day(2024, 1, 10);
        let stats = CycleStatistics::compute(&history, today, fallback);
        assert_eq!(stats.max_cycle_length_seen, fallback);
        assert_eq!(stats.current_cycle.unwrap().projected_length, fallback);
        assert_eq!(max_cycle_length_seen(&history, today, fallback), fallback);
    }

    #[test]
    fn test_statistics_snapshot_matches_free_functions() {
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 1, 29), day(2024, 2, 27)], 5);
        let today = day(2024, 3, 5);
        let stats = CycleStatistics::compute(&history, today, FALLBACK_CYCLE_LENGTH);

        assert_eq!(stats.completed_cycles, completed_cycles(&history));
        assert_eq!(stats.average_cycle_length, average_cycle_length(&history));
        assert_eq!(
            stats.current_cycle,
            current_cycle_projection(&history, today, FALLBACK_CYCLE_LENGTH)
        );
        assert_eq!(
            stats.max_cycle_length_seen,
            max_cycle_length_seen(&history, today, FALLBACK_CYCLE_LENGTH)
        );
    }

    #[test]
    fn test_period_length_stats() {
        let history = PeriodHistory::from_days(
            DayRange::starting_at(day(2024, 1, 1), DayCount::new(4))
                .days()
                .chain(DayRange::starting_at(day(2024, 2, 1), DayCount::new(7)).days()),
        );
        let stats = PeriodLengthStats::compute(&history, DayCount::new(6));

        assert_eq!(stats.periods.len(), 2);
        assert_eq!(stats.periods[0].length, DayCount::new(4));
        assert_eq!(stats.average_period_length, Some(DayCount::new(5)));
        assert_eq!(stats.max_period_length_seen, DayCount::new(7));

        let empty = PeriodLengthStats::compute(&PeriodHistory::default(), DayCount::new(6));
        assert_eq!(empty.average_period_length, None);
        assert_eq!(empty.max_period_length_seen, DayCount::new(6));
    }

    #[test]
    fn test_predict_next_period() {
        let config = PredictionConfig::default();
        let history = history_from_starts(&[day(2024, 1, 1), day(2024, 1, 31)], 5);
        let prediction = predict_next_period(&history, day(2024, 2, 10), &config).unwrap();

        assert_eq!(prediction.span.start, day(2024, 3, 1));
        assert_eq!(prediction.span.len(), DayCount::new(5));
    }

    #[test]
    fn test_predict_next_period_single_record_uses_defaults() {
        let config = PredictionConfig::default();
        let history = history_from_starts(&[day(2024, 1, 1)], 1);
        let prediction = predict_next_period(&history, day(2024, 1, 2), &config).unwrap();

        assert_eq!(prediction.span.start, day(2024, 1, 29));
        // Average of one 1-day period
        assert_eq!(prediction.span.len(), DayCount::new(1));
    }

    #[test]
    fn test_predict_next_period_respects_horizon_and_toggle() {
        let history = history_from_starts(&[day(2024, 1, 1)], 5);

        let config = PredictionConfig {
            prediction_days_ahead: 10,
            ..PredictionConfig::default()
        };
        assert!(predict_next_period(&history, day(2024, 1, 2), &config).is_none());
        assert!(predict_next_period(&history, day(2024, 1, 19), &config).is_some());

        let config = PredictionConfig {
            show_prediction: false,
            ..PredictionConfig::default()
        };
        assert!(predict_next_period(&history, day(2024, 1, 20), &config).is_none());
        assert!(predict_next_period(&PeriodHistory::default(), day(2024, 1, 20), &PredictionConfig::default())
            .is_none());
    }
}
