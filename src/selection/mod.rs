//! Edit sessions over a transient selection draft.
//!
//! A session starts from an optional copy of the committed days, mutates a
//! [`SelectionDraft`] tap by tap through the [`SelectionEditor`], and ends by
//! committing (the draft is regrouped into a new history) or cancelling.

mod editor;
mod frontier;
mod policy;

pub use editor::{picker_state, PickerState, SelectionEditor, TapOutcome};
pub use frontier::ExtensionFrontier;
pub use policy::{AutoPredictionPolicy, Prediction};

use std::collections::BTreeSet;

use crate::day::Day;
use crate::period::PeriodHistory;

/// The uncommitted set of selected days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDraft {
    days: BTreeSet<Day>,
}

impl SelectionDraft {
    /// An empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft holding every committed day of `history`.
    #[must_use]
    pub fn seeded_from(history: &PeriodHistory) -> Self {
        Self {
            days: history.all_days().collect(),
        }
    }

    /// Whether `day` is selected
    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.days.contains(&day)
    }

    /// Select a day. Returns false if it was already selected.
    pub fn insert(&mut self, day: Day) -> bool {
        self.days.insert(day)
    }

    /// Deselect a day. Returns false if it was not selected.
    pub fn remove(&mut self, day: Day) -> bool {
        self.days.remove(&day)
    }

    /// Deselect every day strictly after `day`, returning them ascending.
    pub fn remove_after(&mut self, day: Day) -> Vec<Day> {
        let mut after = self.days.split_off(&day);
        if after.remove(&day) {
            self.days.insert(day);
        }
        after.into_iter().collect()
    }

    /// Selected days in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.iter().copied()
    }

    /// Number of selected days
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The history this draft would commit to.
    #[must_use]
    pub fn implied_history(&self) -> PeriodHistory {
        PeriodHistory::from_days(self.iter())
    }
}

impl Extend<Day> for SelectionDraft {
    fn extend<I: IntoIterator<Item = Day>>(&mut self, iter: I) {
        self.days.extend(iter);
    }
}

impl FromIterator<Day> for SelectionDraft {
    fn from_iter<I: IntoIterator<Item = Day>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
