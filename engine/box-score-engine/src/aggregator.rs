//! Season and trailing-window aggregation of game logs

use crate::models::{EventRecord, RecentWindows, RollingWindowAggregate, StatTotals, Window};
use chrono::NaiveDate;

/// Reduces game logs into window totals and per-game averages
#[derive(Debug, Clone, Copy)]
pub struct StatAggregator {
    today: NaiveDate,
}

impl StatAggregator {
    /// Create an aggregator that evaluates trailing windows relative to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Sum every event; an empty input yields the zero aggregate
    pub fn aggregate<'a, I>(events: I) -> RollingWindowAggregate
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut totals = StatTotals::default();
        for event in events {
            totals.add(event);
        }
        RollingWindowAggregate::from_totals(totals)
    }

    /// Aggregate only the events that fall inside `window`
    pub fn window(&self, events: &[EventRecord], window: Window) -> RollingWindowAggregate {
        Self::aggregate(events.iter().filter(|event| window.contains(self.today, event.game_date)))
    }

    pub fn recent_windows(&self, events: &[EventRecord]) -> RecentWindows {
        RecentWindows {
            last7: self.window(events, Window::Last7),
            last14: self.window(events, Window::Last14),
        }
    }
}
