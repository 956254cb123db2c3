//! Week and day bookkeeping.
//!
//! A week starts at midnight on the configured start-of-week day (Sunday by
//! default). The day index counts active days inside the week, not calendar
//! days: it advances once for each new day the writer shows up, and
//! saturates at the last writing day.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::budget::{BudgetPolicy, TimeBudget, WeekPhase};

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The most recent `start` day on or before `date`.
pub fn week_start(date: NaiveDate, start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7 - start.num_days_from_monday()) % 7;
    date - Duration::days(offset as i64)
}

/// What changed when the calendar caught up with today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rollover {
    None,
    NewDay,
    NewWeek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekState {
    pub week_start: NaiveDate,
    pub day_index: u8,
    pub phase: WeekPhase,
}

impl WeekState {
    /// Day one of the week containing `today`.
    pub fn fresh(today: NaiveDate, start: Weekday) -> Self {
        Self {
            week_start: week_start(today, start),
            day_index: 1,
            phase: WeekPhase::Initial,
        }
    }

    /// Decide how `today` relates to the last active day.
    ///
    /// Same week means `last_active` falls on or after this week's start
    /// and the stored week start matches it. A clock that moved backwards
    /// is treated as the same day.
    pub fn roll_over(
        &mut self,
        last_active: NaiveDate,
        today: NaiveDate,
        start: Weekday,
        policy: &BudgetPolicy,
    ) -> Rollover {
        if today <= last_active {
            return Rollover::None;
        }
        let current_start = week_start(today, start);
        if last_active >= current_start && self.week_start == current_start {
            self.day_index = self.day_index.saturating_add(1).min(policy.days_per_week);
            Rollover::NewDay
        } else {
            *self = Self::fresh(today, start);
            Rollover::NewWeek
        }
    }

    pub fn reclassify(&mut self, budget: &TimeBudget, policy: &BudgetPolicy) -> WeekPhase {
        self.phase = WeekPhase::classify(budget, self.day_index, policy);
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_finds_previous_sunday() {
        // 2026-10-14 is a Wednesday
        assert_eq!(week_start(date(2026, 10, 14), Weekday::Sun), date(2026, 10, 11));
        assert_eq!(week_start(date(2026, 10, 11), Weekday::Sun), date(2026, 10, 11));
        assert_eq!(week_start(date(2026, 10, 17), Weekday::Sun), date(2026, 10, 11));
        assert_eq!(week_start(date(2026, 10, 14), Weekday::Mon), date(2026, 10, 12));
        assert_eq!(week_start(date(2026, 10, 11), Weekday::Mon), date(2026, 10, 5));
    }

    #[test]
    fn same_day_does_not_roll() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 12), Weekday::Sun);
        let rolled = week.roll_over(date(2026, 10, 12), date(2026, 10, 12), Weekday::Sun, &policy);
        assert_eq!(rolled, Rollover::None);
        assert_eq!(week.day_index, 1);
    }

    #[test]
    fn next_day_in_same_week_increments_index() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 12), Weekday::Sun);
        let rolled = week.roll_over(date(2026, 10, 12), date(2026, 10, 14), Weekday::Sun, &policy);
        assert_eq!(rolled, Rollover::NewDay);
        assert_eq!(week.day_index, 2);
        assert_eq!(week.week_start, date(2026, 10, 11));
    }

    #[test]
    fn day_index_saturates_at_last_writing_day() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 11), Weekday::Sun);
        let mut last = date(2026, 10, 11);
        for offset in 1..=6 {
            let today = date(2026, 10, 11) + Duration::days(offset);
            week.roll_over(last, today, Weekday::Sun, &policy);
            last = today;
        }
        assert_eq!(week.day_index, 5);
    }

    #[test]
    fn crossing_week_start_resets() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 14), Weekday::Sun);
        week.day_index = 4;
        week.phase = WeekPhase::BackHalf;
        let rolled = week.roll_over(date(2026, 10, 16), date(2026, 10, 19), Weekday::Sun, &policy);
        assert_eq!(rolled, Rollover::NewWeek);
        assert_eq!(week, WeekState::fresh(date(2026, 10, 19), Weekday::Sun));
        assert_eq!(week.week_start, date(2026, 10, 18));
    }

    #[test]
    fn mismatched_stored_week_start_resets() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 14), Weekday::Sun);
        week.week_start = date(2026, 10, 4);
        let rolled = week.roll_over(date(2026, 10, 14), date(2026, 10, 15), Weekday::Sun, &policy);
        assert_eq!(rolled, Rollover::NewWeek);
    }

    #[test]
    fn clock_moving_backwards_is_ignored() {
        let policy = BudgetPolicy::default();
        let mut week = WeekState::fresh(date(2026, 10, 14), Weekday::Sun);
        let rolled = week.roll_over(date(2026, 10, 14), date(2026, 10, 13), Weekday::Sun, &policy);
        assert_eq!(rolled, Rollover::None);
    }

    #[test]
    fn fixed_clock_clones_share_time() {
        let clock = FixedClock::new(date(2026, 10, 14).and_hms_opt(23, 30, 0).unwrap());
        let handle = clock.clone();
        handle.advance(Duration::hours(1));
        assert_eq!(clock.today(), date(2026, 10, 15));
    }
}
