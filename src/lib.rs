//! # Period Tracker
//!
//! Cycle tracking core for a period calendar.
//!
//! This crate provides:
//! - Grouping of arbitrary day selections into contiguous period records
//! - A tap-driven selection editor with auto-expansion of new periods
//! - Cycle and period length statistics with next-period prediction
//! - O(1) classification of any day against the recorded history
//! - Key-value persistence with one-shot migration of the legacy format
//!
//! ## Example
//!
//! ```
//! use period_tracker::{Day, PeriodHistory, SelectionEditor};
//!
//! let today = Day::from_ymd(2024, 1, 31).unwrap();
//! let mut editor = SelectionEditor::seeded(&PeriodHistory::default(), today, &Default::default());
//! editor.tap(Day::from_ymd(2024, 1, 1).unwrap());
//! let history = editor.commit();
//! assert_eq!(history.records()[0].length().get(), 6);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod config;
pub mod date_range;
pub mod day;
pub mod display;
pub mod error;
pub mod membership;
pub mod period;
pub mod selection;
pub mod status;
pub mod store;
pub mod tracker;
pub mod types;

pub use analytics::{CycleStatistics, NextPeriodPrediction, PeriodLengthStats};
pub use config::Config;
pub use date_range::DayRange;
pub use day::Day;
pub use error::{Error, Result};
pub use membership::MembershipIndex;
pub use period::{build_history, PeriodHistory, PeriodRecord};
pub use selection::{AutoPredictionPolicy, ExtensionFrontier, PickerState, SelectionEditor, TapOutcome};
pub use status::{CalendarMark, DayStatusClassifier, SelectedDayStatus};
pub use store::{FileStore, KeyValueStore, LoadStatus, MemoryStore, PersistenceGateway};
pub use tracker::{Clock, FixedClock, PeriodTracker, SystemClock, TrackerEvent};
pub use types::DayCount;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "period-tracker";
