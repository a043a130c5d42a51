//! Grouping arbitrary day selections into period records.

use crate::day::Day;

use super::{PeriodHistory, PeriodRecord};

/// Group any collection of days into a history of contiguous records.
///
/// Input may be empty, unsorted and contain duplicates. The union of the
/// output's days equals the deduplicated input, and a new record starts
/// wherever two consecutive days are not exactly one day apart. This never
/// fails.
pub fn build_history(days: impl IntoIterator<Item = Day>) -> PeriodHistory {
    let mut days: Vec<Day> = days.into_iter().collect();
    days.sort_unstable();
    days.dedup();

    let mut records = Vec::new();
    let mut iter = days.into_iter();
    let Some(first) = iter.next() else {
        return PeriodHistory::default();
    };

    let mut run_start = first;
    let mut run_end = first;
    let mut run = vec![first];

    for day in iter {
        if day.days_since(run_end) == 1 {
            run.push(day);
        } else {
            records.push(PeriodRecord::from_run(std::mem::take(&mut run), run_start, run_end));
            run_start = day;
            run.push(day);
        }
        run_end = day;
    }

    // Don't forget the last run
    records.push(PeriodRecord::from_run(run, run_start, run_end));

    PeriodHistory::from_sorted(records)
}
