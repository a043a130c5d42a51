//! Observable state container tying history, editing and persistence together.
//!
//! A [`PeriodTracker`] owns the committed history and its membership index,
//! the selected day and visible week of a calendar, and at most one open
//! [`SelectionEditor`]. Every mutation runs to completion before listeners
//! are notified.

use std::cell::Cell;

use tracing::{debug, info};

use crate::analytics::{self, CycleStatistics, NextPeriodPrediction, PeriodLengthStats};
use crate::config::PredictionConfig;
use crate::date_range::{DayRange, DAYS_PER_WEEK};
use crate::day::Day;
use crate::membership::MembershipIndex;
use crate::period::PeriodHistory;
use crate::selection::{PickerState, SelectionDraft, SelectionEditor, TapOutcome};
use crate::status::{CalendarMark, DayStatusClassifier, SelectedDayStatus};
use crate::store::{KeyValueStore, LoadStatus, PersistenceGateway};

/// Source of "today".
pub trait Clock {
    fn today(&self) -> Day;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Day {
        Day::today()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    today: Cell<Day>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(today: Day) -> Self {
        Self {
            today: Cell::new(today),
        }
    }

    pub fn set(&self, today: Day) {
        self.today.set(today);
    }

    pub fn advance(&self, days: i64) {
        self.today.set(self.today.get().add_days(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> Day {
        self.today.get()
    }
}

/// Something observers may want to redraw for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A commit replaced the committed history
    HistoryReplaced,
    /// An editing session opened, changed, or closed without committing
    DraftChanged,
    /// The selected day or visible week moved
    SelectedDayChanged,
    /// The calendar date advanced and the selection was reset to `today`
    DateRolledOver { today: Day },
}

/// Handle returned by [`PeriodTracker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TrackerEvent)>;

/// Observable tracker state.
pub struct PeriodTracker<S, C = SystemClock> {
    gateway: PersistenceGateway<S>,
    clock: C,
    config: PredictionConfig,
    history: PeriodHistory,
    index: MembershipIndex,
    load_status: LoadStatus,
    editor: Option<SelectionEditor>,
    today: Day,
    selected_day: Day,
    visible_week: DayRange,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore, C: Clock> PeriodTracker<S, C> {
    /// Load the history through `gateway` and select today.
    pub fn new(mut gateway: PersistenceGateway<S>, clock: C, config: PredictionConfig) -> Self {
        let (history, load_status) = gateway.load_with_status();
        let today = clock.today();
        info!(
            periods = history.len(),
            status = ?load_status,
            %today,
            "Tracker started"
        );

        Self {
            gateway,
            clock,
            config,
            index: MembershipIndex::from_history(&history),
            history,
            load_status,
            editor: None,
            today,
            selected_day: today,
            visible_week: DayRange::week_containing(today),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // Accessors

    pub const fn history(&self) -> &PeriodHistory {
        &self.history
    }

    pub const fn index(&self) -> &MembershipIndex {
        &self.index
    }

    /// How the initial load went
    pub const fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    /// Last observed today
    pub const fn today(&self) -> Day {
        self.today
    }

    pub const fn selected_day(&self) -> Day {
        self.selected_day
    }

    /// Monday-start week containing the selected day
    pub const fn visible_week(&self) -> DayRange {
        self.visible_week
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    /// The open editing session, if any
    pub const fn editor(&self) -> Option<&SelectionEditor> {
        self.editor.as_ref()
    }

    pub const fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    // Observation

    /// Register a listener for every subsequent event.
    pub fn subscribe(&mut self, listener: impl FnMut(&TrackerEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &TrackerEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    // Editing

    /// Open an editing session, replacing any open one.
    ///
    /// With `seed_from_history` the draft starts with every committed day;
    /// otherwise it starts empty and a commit replaces the history with only
    /// the days tapped in this session.
    pub fn begin_edit(&mut self, seed_from_history: bool) {
        let draft = if seed_from_history {
            SelectionDraft::seeded_from(&self.history)
        } else {
            SelectionDraft::new()
        };
        self.editor = Some(SelectionEditor::with_config(draft, self.today, &self.config));
        debug!(seed_from_history, "Editing session opened");
        self.emit(&TrackerEvent::DraftChanged);
    }

    /// Tap `day` in the open session. `None` when no session is open.
    pub fn tap(&mut self, day: Day) -> Option<TapOutcome> {
        let outcome = self.editor.as_mut()?.tap(day);
        if outcome.changed_draft() {
            self.emit(&TrackerEvent::DraftChanged);
        }
        Some(outcome)
    }

    /// Commit the open session: regroup, replace history, persist.
    ///
    /// Returns `false` when no session is open.
    pub fn commit(&mut self) -> bool {
        let Some(editor) = self.editor.take() else {
            return false;
        };

        self.history = editor.commit();
        self.index = MembershipIndex::from_history(&self.history);
        self.gateway.save(&self.history);
        info!(
            periods = self.history.len(),
            days = self.history.total_days(),
            "Committed period history"
        );
        self.emit(&TrackerEvent::HistoryReplaced);
        true
    }

    /// Discard the open session. Returns `false` when none was open.
    pub fn cancel(&mut self) -> bool {
        if self.editor.take().is_none() {
            return false;
        }
        debug!("Editing session cancelled");
        self.emit(&TrackerEvent::DraftChanged);
        true
    }

    // Date handling

    /// Check the clock and reset the selection if the date advanced.
    ///
    /// Returns whether a rollover happened.
    pub fn on_possible_date_rollover(&mut self) -> bool {
        let today = self.clock.today();
        if today == self.today {
            return false;
        }

        info!(from = %self.today, to = %today, "Date rolled over");
        self.today = today;
        if let Some(editor) = self.editor.as_mut() {
            editor.set_today(today);
        }
        self.set_selected(today);
        self.emit(&TrackerEvent::DateRolledOver { today });
        true
    }

    /// Select `day` and show its week.
    pub fn select_day(&mut self, day: Day) {
        self.set_selected(day);
        self.emit(&TrackerEvent::SelectedDayChanged);
    }

    pub fn next_week(&mut self) {
        self.select_day(self.selected_day.add_days(DAYS_PER_WEEK));
    }

    pub fn previous_week(&mut self) {
        self.select_day(self.selected_day.add_days(-DAYS_PER_WEEK));
    }

    fn set_selected(&mut self, day: Day) {
        self.selected_day = day;
        self.visible_week = DayRange::week_containing(day);
    }

    // Queries

    fn classifier(&self) -> DayStatusClassifier<'_> {
        DayStatusClassifier::new(&self.history, &self.index)
    }

    /// Classify `day` against the committed history.
    pub fn classify(&self, day: Day) -> SelectedDayStatus {
        self.classifier().classify(day)
    }

    /// Whether `day` is a committed period day.
    pub fn is_recorded(&self, day: Day) -> bool {
        self.index.contains(day)
    }

    /// Picker state of `day` in the open session.
    pub fn state_for_picker(&self, day: Day) -> Option<PickerState> {
        self.editor.as_ref().map(|e| e.state_for(day))
    }

    pub fn statistics(&self) -> CycleStatistics {
        CycleStatistics::compute(&self.history, self.today, self.config.fallback_cycle_length())
    }

    pub fn period_length_stats(&self) -> PeriodLengthStats {
        PeriodLengthStats::compute(&self.history, self.config.default_period_length())
    }

    pub fn predict_next_period(&self) -> Option<NextPeriodPrediction> {
        analytics::predict_next_period(&self.history, self.today, &self.config)
    }

    /// Calendar marking of `day`, including the predicted next period.
    pub fn calendar_mark(&self, day: Day) -> CalendarMark {
        let prediction = self.predict_next_period();
        self.classifier().calendar_mark(day, prediction.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::store::{decode_history, encode_history, MemoryStore, LEGACY_RECORDS_KEY, RECORDS_KEY};
    use crate::types::DayCount;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn day(y: i32, m: u32, d: u32) -> Day {
        Day::from_ymd(y, m, d).unwrap()
    }

    fn tracker_at(today: Day) -> PeriodTracker<MemoryStore, FixedClock> {
        PeriodTracker::new(
            PersistenceGateway::new(MemoryStore::new()),
            FixedClock::new(today),
            PredictionConfig::default(),
        )
    }

    fn record_events(tracker: &mut PeriodTracker<MemoryStore, FixedClock>) -> Rc<RefCell<Vec<TrackerEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tracker.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    /// Memory store whose first write fails.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failed_once: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
            if !self.failed_once {
                self.failed_once = true;
                return Err(Error::other("disk full"));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_starts_on_today() {
        let tracker = tracker_at(day(2024, 3, 13));
        assert_eq!(tracker.selected_day(), day(2024, 3, 13));
        assert_eq!(tracker.visible_week().start, day(2024, 3, 11));
        assert_eq!(tracker.load_status(), LoadStatus::Empty);
        assert!(!tracker.is_editing());
    }

    #[test]
    fn test_tap_and_commit_without_session_are_noops() {
        let mut tracker = tracker_at(day(2024, 3, 13));
        assert!(tracker.tap(day(2024, 3, 1)).is_none());
        assert!(!tracker.commit());
        assert!(!tracker.cancel());
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn test_edit_commit_persists_and_notifies() {
        let mut tracker = tracker_at(day(2024, 1, 31));
        let events = record_events(&mut tracker);

        tracker.begin_edit(true);
        let outcome = tracker.tap(day(2024, 1, 1)).unwrap();
        assert!(outcome.changed_draft());
        assert!(tracker.commit());

        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.history().records()[0].length(), DayCount::new(6));
        assert!(tracker.is_recorded(day(2024, 1, 6)));
        assert!(!tracker.is_recorded(day(2024, 1, 7)));
        assert!(tracker.gateway().store().contains_key(RECORDS_KEY));

        assert_eq!(
            *events.borrow(),
            vec![
                TrackerEvent::DraftChanged,
                TrackerEvent::DraftChanged,
                TrackerEvent::HistoryReplaced
            ]
        );
    }

    #[test]
    fn test_cancel_keeps_history() {
        let mut tracker = tracker_at(day(2024, 1, 31));
        tracker.begin_edit(true);
        tracker.tap(day(2024, 1, 1));
        assert!(tracker.cancel());
        assert!(tracker.history().is_empty());
        assert!(tracker.state_for_picker(day(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_unseeded_session_replaces_history() {
        let mut tracker = tracker_at(day(2024, 3, 31));
        tracker.begin_edit(true);
        tracker.tap(day(2024, 1, 1));
        tracker.commit();

        tracker.begin_edit(false);
        tracker.tap(day(2024, 3, 1));
        tracker.commit();

        assert_eq!(tracker.history().len(), 1);
        assert_eq!(tracker.history().records()[0].start(), day(2024, 3, 1));
        assert!(!tracker.is_recorded(day(2024, 1, 1)));
    }

    #[test]
    fn test_history_survives_restart() {
        let mut tracker = tracker_at(day(2024, 1, 31));
        tracker.begin_edit(true);
        tracker.tap(day(2024, 1, 1));
        tracker.commit();
        let saved = tracker.history().clone();

        let store = tracker.gateway.into_inner();
        let reopened = PeriodTracker::new(
            PersistenceGateway::new(store),
            FixedClock::new(day(2024, 2, 1)),
            PredictionConfig::default(),
        );
        assert_eq!(reopened.load_status(), LoadStatus::Loaded);
        assert_eq!(reopened.history(), &saved);
    }

    #[test]
    fn test_rollover_resets_selection() {
        let mut tracker = tracker_at(day(2024, 3, 10));
        tracker.select_day(day(2024, 2, 1));
        tracker.begin_edit(true);
        let events = record_events(&mut tracker);

        assert!(!tracker.on_possible_date_rollover());

        tracker.clock().advance(1);
        assert!(tracker.on_possible_date_rollover());
        assert_eq!(tracker.today(), day(2024, 3, 11));
        assert_eq!(tracker.selected_day(), day(2024, 3, 11));
        assert_eq!(tracker.visible_week().start, day(2024, 3, 11));
        assert_eq!(tracker.editor().unwrap().today(), day(2024, 3, 11));
        assert_eq!(
            *events.borrow(),
            vec![TrackerEvent::DateRolledOver { today: day(2024, 3, 11) }]
        );
    }

    #[test]
    fn test_week_navigation() {
        let mut tracker = tracker_at(day(2024, 3, 13));
        tracker.next_week();
        assert_eq!(tracker.selected_day(), day(2024, 3, 20));
        assert_eq!(tracker.visible_week().start, day(2024, 3, 18));

        tracker.previous_week();
        tracker.previous_week();
        assert_eq!(tracker.selected_day(), day(2024, 3, 6));
        assert_eq!(tracker.visible_week().start, day(2024, 3, 4));
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut tracker = tracker_at(day(2024, 3, 13));
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let id = tracker.subscribe(move |_| sink.set(sink.get() + 1));

        tracker.next_week();
        assert!(tracker.unsubscribe(id));
        assert!(!tracker.unsubscribe(id));
        tracker.next_week();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_queries_follow_committed_history() {
        let mut tracker = tracker_at(day(2024, 2, 10));
        tracker.begin_edit(true);
        tracker.tap(day(2024, 1, 1));
        tracker.tap(day(2024, 1, 29));
        tracker.commit();

        assert_eq!(
            tracker.classify(day(2024, 1, 30)),
            SelectedDayStatus::InPeriod { day_number: DayCount::new(2) }
        );
        assert_eq!(tracker.statistics().average_cycle_length, Some(DayCount::new(28)));
        assert_eq!(
            tracker.period_length_stats().average_period_length,
            Some(DayCount::new(6))
        );

        let prediction = tracker.predict_next_period().unwrap();
        assert_eq!(prediction.span.start, day(2024, 2, 26));
        assert_eq!(tracker.calendar_mark(day(2024, 2, 27)), CalendarMark::Predicted);
        assert_eq!(tracker.calendar_mark(day(2024, 1, 29)), CalendarMark::Recorded(DayCount::new(1)));
    }

    #[test]
    fn test_migrated_history_is_kept_when_write_back_fails() {
        let mut store = FlakyStore::default();
        store
            .inner
            .set(LEGACY_RECORDS_KEY, br#"[{"start":"2024-01-01"}]"#)
            .unwrap();
        let mut tracker = PeriodTracker::new(
            PersistenceGateway::new(store),
            FixedClock::new(day(2024, 3, 1)),
            PredictionConfig::default(),
        );
        assert_eq!(tracker.load_status(), LoadStatus::Migrated);
        assert_eq!(tracker.history().len(), 1);

        tracker.begin_edit(true);
        tracker.tap(day(2024, 2, 20));
        assert!(tracker.commit());

        let written = tracker.gateway().store().inner.get(RECORDS_KEY).unwrap().unwrap();
        let saved = decode_history(&written).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.records()[0].start(), day(2024, 1, 1));
    }

    #[test]
    fn test_history_at_last_supported_day() {
        let last = Day::max_supported();
        let history = PeriodHistory::from_days([last.add_days(-40), last.add_days(-2), last.previous(), last]);
        let mut store = MemoryStore::new();
        store.set(RECORDS_KEY, &encode_history(&history).unwrap()).unwrap();

        let mut tracker = PeriodTracker::new(
            PersistenceGateway::new(store),
            FixedClock::new(last),
            PredictionConfig::default(),
        );
        assert_eq!(tracker.load_status(), LoadStatus::Loaded);

        tracker.begin_edit(true);
        assert_eq!(tracker.state_for_picker(last), Some(PickerState::Selected));
        tracker.next_week();
        let prediction = tracker.predict_next_period().unwrap();
        assert_eq!(prediction.span.end, last);
        assert_eq!(tracker.calendar_mark(last), CalendarMark::Recorded(DayCount::new(3)));
        assert_eq!(
            tracker.classify(last),
            SelectedDayStatus::InPeriod { day_number: DayCount::new(3) }
        );

        tracker.tap(last);
        assert!(tracker.commit());
        assert_eq!(tracker.history().records()[1].end(), last.previous());
    }

    #[test]
    fn test_statistics_follow_configured_fallback() {
        let config = PredictionConfig {
            fallback_cycle_length: 35,
            ..PredictionConfig::default()
        };
        let mut tracker = PeriodTracker::new(
            PersistenceGateway::new(MemoryStore::new()),
            FixedClock::new(day(2024, 1, 10)),
            config,
        );
        tracker.begin_edit(true);
        tracker.tap(day(2024, 1, 1));
        tracker.commit();

        let stats = tracker.statistics();
        assert_eq!(stats.max_cycle_length_seen, DayCount::new(35));
        assert_eq!(stats.current_cycle.unwrap().projected_length, DayCount::new(35));
        assert_eq!(tracker.predict_next_period().unwrap().span.start, day(2024, 2, 5));
    }
}
