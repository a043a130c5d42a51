//! The tap-driven selection state machine.

use tracing::debug;

use crate::config::PredictionConfig;
use crate::day::Day;
use crate::period::PeriodHistory;

use super::{AutoPredictionPolicy, ExtensionFrontier, Prediction, SelectionDraft};

/// How a day should be presented in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickerState {
    /// In the draft
    Selected,
    /// Extends a period, after today
    ExtendableFuture,
    /// Extends a period, today or earlier
    ExtendablePast,
    /// Too far ahead to tap
    DisabledFarFuture,
    /// Tappable, subject to auto-prediction
    Normal,
}

/// What a tap did to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// The day was deselected, along with any cascaded later days
    Removed { day: Day, cascaded: Vec<Day> },
    /// A period grew by one day
    Extended(Day),
    /// The policy chose what to add
    Added(Prediction),
    /// Nothing changed
    Ignored,
}

impl TapOutcome {
    /// Whether the draft changed.
    #[must_use]
    pub const fn changed_draft(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Picker state of `day` as a pure function of the draft, today and the
/// draft's extension frontier.
///
/// `far_future_after_days` is how many days past today remain tappable.
#[must_use]
pub fn picker_state(
    day: Day,
    draft: &SelectionDraft,
    today: Day,
    frontier: &ExtensionFrontier,
    far_future_after_days: i64,
) -> PickerState {
    if draft.contains(day) {
        PickerState::Selected
    } else if frontier.contains(day) {
        if day > today {
            PickerState::ExtendableFuture
        } else {
            PickerState::ExtendablePast
        }
    } else if day.days_since(today) > far_future_after_days {
        PickerState::DisabledFarFuture
    } else {
        PickerState::Normal
    }
}

/// Mediates taps against a draft for one edit session.
///
/// The draft's implied history and frontier are cached and recomputed after
/// every change, so picker queries stay cheap.
#[derive(Debug, Clone)]
pub struct SelectionEditor {
    draft: SelectionDraft,
    today: Day,
    policy: AutoPredictionPolicy,
    far_future_after_days: i64,
    implied: PeriodHistory,
    frontier: ExtensionFrontier,
}

impl SelectionEditor {
    /// Open a session over `draft` with default tunables.
    #[must_use]
    pub fn new(draft: SelectionDraft, today: Day) -> Self {
        Self::with_config(draft, today, &PredictionConfig::default())
    }

    /// Open a session over `draft` using `config`.
    #[must_use]
    pub fn with_config(draft: SelectionDraft, today: Day, config: &PredictionConfig) -> Self {
        let mut editor = Self {
            draft,
            today,
            policy: AutoPredictionPolicy::from(config),
            far_future_after_days: config.far_future_after_days,
            implied: PeriodHistory::default(),
            frontier: ExtensionFrontier::default(),
        };
        editor.refresh();
        editor
    }

    /// Open a session pre-seeded with every committed day.
    #[must_use]
    pub fn seeded(history: &PeriodHistory, today: Day, config: &PredictionConfig) -> Self {
        Self::with_config(SelectionDraft::seeded_from(history), today, config)
    }

    /// The current draft
    #[must_use]
    pub const fn draft(&self) -> &SelectionDraft {
        &self.draft
    }

    /// The day treated as today
    #[must_use]
    pub const fn today(&self) -> Day {
        self.today
    }

    /// Move "today" forward or back, e.g. after a date rollover.
    pub fn set_today(&mut self, today: Day) {
        self.today = today;
    }

    /// The history the draft would commit to
    #[must_use]
    pub const fn implied_history(&self) -> &PeriodHistory {
        &self.implied
    }

    /// The draft's extendable days
    #[must_use]
    pub const fn frontier(&self) -> &ExtensionFrontier {
        &self.frontier
    }

    /// Picker state of `day` in this session.
    #[must_use]
    pub fn state_for(&self, day: Day) -> PickerState {
        picker_state(
            day,
            &self.draft,
            self.today,
            &self.frontier,
            self.far_future_after_days,
        )
    }

    /// Apply a tap on `day`.
    pub fn tap(&mut self, day: Day) -> TapOutcome {
        let outcome = match self.state_for(day) {
            PickerState::Selected => {
                self.draft.remove(day);
                // Removing today or a future day also drops everything after
                // it; past removals never cascade.
                let cascaded = if day >= self.today {
                    self.draft.remove_after(day)
                } else {
                    Vec::new()
                };
                TapOutcome::Removed { day, cascaded }
            }
            PickerState::ExtendableFuture | PickerState::ExtendablePast => {
                self.draft.insert(day);
                TapOutcome::Extended(day)
            }
            PickerState::Normal => {
                let prediction = self.policy.decide(day, &self.implied);
                self.draft.extend(prediction.days());
                TapOutcome::Added(prediction)
            }
            PickerState::DisabledFarFuture => TapOutcome::Ignored,
        };

        debug!(%day, ?outcome, "tap");

        if outcome.changed_draft() {
            self.refresh();
        }
        outcome
    }

    /// End the session, regrouping the draft into a new history.
    #[must_use]
    pub fn commit(self) -> PeriodHistory {
        self.implied
    }

    fn refresh(&mut self) {
        self.implied = self.draft.implied_history();
        self.frontier = ExtensionFrontier::of(&self.implied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DayCount;

    fn day(y: i32, m: u32, d: u32) -> Day {
        Day::from_ymd(y, m, d).unwrap()
    }

    fn today() -> Day {
        day(2024, 6, 15)
    }

    fn editor_with(days: impl IntoIterator<Item = Day>) -> SelectionEditor {
        SelectionEditor::new(days.into_iter().collect(), today())
    }

    #[test]
    fn test_tap_isolated_day_auto_predicts() {
        let d = day(2024, 6, 1);
        let mut editor = editor_with([]);
        let outcome = editor.tap(d);

        assert!(matches!(outcome, TapOutcome::Added(p) if p.is_expanded()));
        let selected: Vec<_> = editor.draft().iter().collect();
        assert_eq!(selected, (0..6).map(|i| d.add_days(i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_tap_near_previous_period_adds_single_day() {
        let d = day(2024, 6, 1);
        let mut editor = editor_with([d]);
        editor.tap(d.add_days(4));

        assert_eq!(editor.draft().len(), 2);
        assert!(editor.draft().contains(d.add_days(4)));
        assert!(!editor.draft().contains(d.add_days(5)));
    }

    #[test]
    fn test_tap_frontier_extends_by_one() {
        let end = day(2024, 6, 3);
        let mut editor = editor_with([day(2024, 6, 1), day(2024, 6, 2), end]);
        assert_eq!(editor.state_for(end.next()), PickerState::ExtendablePast);

        let outcome = editor.tap(end.next());
        assert_eq!(outcome, TapOutcome::Extended(end.next()));
        assert_eq!(editor.draft().len(), 4);
        assert_eq!(editor.implied_history().len(), 1);
        assert_eq!(editor.implied_history().records()[0].length(), DayCount::new(4));
        // The frontier moved with the period
        assert!(editor.frontier().contains(end.add_days(2)));
    }

    #[test]
    fn test_far_future_frontier_is_still_extendable() {
        let t = today();
        let mut editor = editor_with([t.add_days(10), t.add_days(11)]);
        let next = t.add_days(12);

        assert_eq!(editor.state_for(next), PickerState::ExtendableFuture);
        assert_eq!(editor.tap(next), TapOutcome::Extended(next));
    }

    #[test]
    fn test_far_future_tap_is_ignored() {
        let mut editor = editor_with([]);
        let tomorrow = today().next();

        assert_eq!(editor.state_for(tomorrow), PickerState::DisabledFarFuture);
        assert_eq!(editor.tap(tomorrow), TapOutcome::Ignored);
        assert!(editor.draft().is_empty());
    }

    #[test]
    fn test_far_future_window_is_configurable() {
        let config = PredictionConfig {
            far_future_after_days: 3,
            ..PredictionConfig::default()
        };
        let editor = SelectionEditor::with_config(SelectionDraft::new(), today(), &config);
        assert_eq!(editor.state_for(today().add_days(3)), PickerState::Normal);
        assert_eq!(editor.state_for(today().add_days(4)), PickerState::DisabledFarFuture);
    }

    #[test]
    fn test_untap_today_cascades_forward() {
        let t = today();
        let mut editor = editor_with([t, t.add_days(1), t.add_days(2)]);
        let outcome = editor.tap(t);

        assert_eq!(
            outcome,
            TapOutcome::Removed {
                day: t,
                cascaded: vec![t.add_days(1), t.add_days(2)],
            }
        );
        assert!(editor.draft().is_empty());
    }

    #[test]
    fn test_untap_future_day_cascades_from_tap() {
        let d = today().add_days(3);
        let mut editor = editor_with([d, d.add_days(1), d.add_days(2)]);
        editor.tap(d.add_days(1));

        assert_eq!(editor.draft().iter().collect::<Vec<_>>(), vec![d]);
    }

    #[test]
    fn test_untap_past_day_never_cascades() {
        let d = day(2024, 6, 1);
        let mut editor = editor_with([d, d.add_days(1), d.add_days(2)]);
        let outcome = editor.tap(d.add_days(1));

        assert_eq!(
            outcome,
            TapOutcome::Removed {
                day: d.add_days(1),
                cascaded: Vec::new(),
            }
        );
        assert_eq!(editor.draft().iter().collect::<Vec<_>>(), vec![d, d.add_days(2)]);
        assert_eq!(editor.implied_history().len(), 2);
    }

    #[test]
    fn test_picker_state_precedence() {
        let t = today();
        let draft: SelectionDraft = [t.add_days(-3), t.add_days(-2)].into_iter().collect();
        let frontier = ExtensionFrontier::of(&draft.implied_history());

        assert_eq!(picker_state(t.add_days(-3), &draft, t, &frontier, 0), PickerState::Selected);
        assert_eq!(picker_state(t.add_days(-1), &draft, t, &frontier, 0), PickerState::ExtendablePast);
        assert_eq!(picker_state(t.add_days(-10), &draft, t, &frontier, 0), PickerState::Normal);
        assert_eq!(picker_state(t, &draft, t, &frontier, 0), PickerState::Normal);
        assert_eq!(picker_state(t.next(), &draft, t, &frontier, 0), PickerState::DisabledFarFuture);
    }

    #[test]
    fn test_commit_groups_draft() {
        let mut editor = editor_with([]);
        editor.tap(day(2024, 5, 1));
        editor.tap(day(2024, 5, 29));
        let history = editor.commit();

        assert_eq!(history.len(), 2);
        assert_eq!(history.total_days(), 12);
    }

    #[test]
    fn test_seeded_session_starts_from_history() {
        let history = PeriodHistory::from_days([day(2024, 5, 1), day(2024, 5, 2)]);
        let editor = SelectionEditor::seeded(&history, today(), &PredictionConfig::default());
        assert_eq!(editor.state_for(day(2024, 5, 2)), PickerState::Selected);
        assert_eq!(editor.state_for(day(2024, 5, 3)), PickerState::ExtendablePast);
    }
}
