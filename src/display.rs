//! Display utilities for formatting tracker output.
//!
//! This module provides shared formatting functions used by the CLI
//! for showing period history and cycle statistics in the terminal.
//!
//! # Functions
//!
//! - [`make_bar`] - Create visual bar charts for relative values
//! - [`describe_status`] / [`describe_outcome`] - One-line summaries
//! - [`print_section`] / [`print_section_simple`] - Print section headers
//! - [`display_week`] / [`display_history`] / [`display_cycles`] / etc. - Display formatted data

use chrono::Datelike;

use crate::analytics::{CycleStatistics, NextPeriodPrediction, PeriodLengthStats};
use crate::date_range::DayRange;
use crate::day::Day;
use crate::period::PeriodHistory;
use crate::selection::{Prediction, TapOutcome};
use crate::status::{CalendarMark, SelectedDayStatus};

const BAR_WIDTH: usize = 28;

/// Create a visual bar for displaying relative values.
///
/// Uses Unicode block characters to create a proportional bar chart.
///
/// # Arguments
///
/// * `value` - The value to represent (negative values treated as 0)
/// * `max_value` - The maximum value (determines 100% width)
/// * `width` - The total width of the bar in characters
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn make_bar(value: i64, max_value: i64, width: usize) -> String {
    if max_value <= 0 || value <= 0 {
        return " ".repeat(width);
    }
    let ratio = (value as f64 / max_value as f64).clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// One-line description of a classified day.
pub fn describe_status(status: &SelectedDayStatus) -> String {
    match status {
        SelectedDayStatus::BeforeAllPeriods => "No period recorded before this day".to_string(),
        SelectedDayStatus::InPeriod { day_number } => format!("Period day {}", day_number.get()),
        SelectedDayStatus::AfterPeriod {
            days_since_last_start,
            is_most_recent_cycle: true,
        } => format!("Cycle day {} (current cycle)", days_since_last_start.get()),
        SelectedDayStatus::AfterPeriod {
            days_since_last_start,
            is_most_recent_cycle: false,
        } => format!("Cycle day {}", days_since_last_start.get()),
    }
}

/// One-line description of what a tap did.
pub fn describe_outcome(outcome: &TapOutcome) -> String {
    match outcome {
        TapOutcome::Removed { day, cascaded } if cascaded.is_empty() => format!("removed {day}"),
        TapOutcome::Removed { day, cascaded } => {
            format!("removed {day} and {} later day(s)", cascaded.len())
        }
        TapOutcome::Extended(day) => format!("extended with {day}"),
        TapOutcome::Added(Prediction::SingleDay(day)) => format!("added {day}"),
        TapOutcome::Added(Prediction::Expanded(span)) => {
            format!("added {span} ({})", span.len())
        }
        TapOutcome::Ignored => "ignored (too far in the future)".to_string(),
    }
}

/// Single-character calendar symbol.
const fn mark_symbol(mark: CalendarMark) -> char {
    match mark {
        CalendarMark::Recorded(_) => '●',
        CalendarMark::Predicted => '○',
        CalendarMark::Unmarked => '·',
    }
}

/// Render one week as a strip of weekday labels over marks.
///
/// The selected day is bracketed.
pub fn format_week(week: DayRange, selected: Day, mark: impl Fn(Day) -> CalendarMark) -> String {
    let cells: Vec<String> = week
        .days()
        .map(|day| {
            let label = format!("{} {:>2}", day.date().format("%a"), day.date().day());
            let symbol = mark_symbol(mark(day));
            if day == selected {
                format!("[{label} {symbol}]")
            } else {
                format!(" {label} {symbol} ")
            }
        })
        .collect();
    cells.join("")
}

/// Print a section header with equals signs.
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(50));
    println!("  {title}");
    println!("{}", "=".repeat(50));
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Display a week strip.
pub fn display_week(week: DayRange, selected: Day, mark: impl Fn(Day) -> CalendarMark) {
    println!("  {}", format_week(week, selected, mark));
}

/// Display every recorded period.
pub fn display_history(history: &PeriodHistory) {
    if history.is_empty() {
        println!("  No periods recorded.");
        return;
    }
    for (i, record) in history.iter().enumerate() {
        println!(
            "  {:3}. {}  {:>8}",
            i + 1,
            record.span(),
            record.length().to_string()
        );
    }
}

/// Display completed cycles as bars plus the current cycle projection.
pub fn display_cycles(stats: &CycleStatistics) {
    let max = stats.max_cycle_length_seen.get();

    if stats.completed_cycles.is_empty() {
        println!("  No completed cycles yet.");
    }
    for cycle in &stats.completed_cycles {
        println!(
            "  {}  {} {:>3}d (period {}d)",
            cycle.period_start,
            make_bar(cycle.cycle_length.get(), max, BAR_WIDTH),
            cycle.cycle_length.get(),
            cycle.period_length.get()
        );
    }

    if let Some(average) = stats.average_cycle_length {
        println!("\n  Average cycle:    {:>10}", average.to_string());
    }

    if let Some(current) = &stats.current_cycle {
        println!(
            "  Current cycle:    day {} of ~{} (ends ~{})",
            current.elapsed_days.get(),
            current.projected_length.get(),
            current.projected_end
        );
        println!(
            "  {}  {}",
            current.cycle_start,
            make_bar(current.elapsed_days.get(), max, BAR_WIDTH)
        );
    }
}

/// Display period length statistics.
pub fn display_period_lengths(stats: &PeriodLengthStats) {
    if let Some(average) = stats.average_period_length {
        println!("  Average period:   {:>10}", average.to_string());
        println!("  Longest period:   {:>10}", stats.max_period_length_seen.to_string());
    } else {
        println!("  No periods recorded.");
    }
}

/// Display the next predicted period, if any.
pub fn display_prediction(prediction: Option<&NextPeriodPrediction>) {
    match prediction {
        Some(p) => println!("  Next period:      {} ({})", p.span, p.span.len()),
        None => println!("  Next period:      no prediction"),
    }
}
