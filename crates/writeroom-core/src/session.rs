//! Session manager: the one owner of budgets, week state and history.
//!
//! Construct one per process and pass it by reference. Every committed
//! mutation is written through the [`StateStore`] before the call returns.

use chrono::{NaiveDate, Utc, Weekday};
use serde::Serialize;
use tracing::{debug, info};

use crate::budget::{self, BudgetPolicy, SessionPlan, TimeBudget, WeekPhase};
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::record::{ManualEntry, Reflection, SessionRecord};
use crate::stage::{Stage, StageMap};
use crate::storage::{PersistedState, StateStore};
use crate::timer::{SessionEngine, SessionSeed, SessionState, StopRequest, TickSink};
use crate::week::{Clock, Rollover, WeekState};

/// What the writer fills in before starting.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub stage: Option<Stage>,
    pub title: String,
    pub session_plan: String,
    pub process_notes: String,
}

/// Read-only overview for display.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub day_index: u8,
    pub phase: WeekPhase,
    pub daily_remaining: u64,
    pub weekly_remaining: StageMap<u64>,
    pub total_used: u64,
    pub available_stages: Vec<Stage>,
    pub session_state: SessionState,
    pub daily_plan: String,
    pub tomorrow_plan: Option<String>,
    pub sessions_today: usize,
}

pub struct SessionManager<S: StateStore, C: Clock> {
    policy: BudgetPolicy,
    week_start_day: Weekday,
    store: S,
    clock: C,
    budget: TimeBudget,
    week: WeekState,
    last_active: NaiveDate,
    engine: SessionEngine,
    sessions: Vec<SessionRecord>,
    daily_plan: String,
    tomorrow_plan: Option<String>,
}

impl<S: StateStore, C: Clock> SessionManager<S, C> {
    /// Load state (or start fresh), catch up with today and save.
    pub fn open(policy: BudgetPolicy, week_start_day: Weekday, store: S, clock: C) -> Result<Self> {
        let today = clock.today();
        let loaded = store.load_state();
        let mut manager = match loaded {
            Some(state) => {
                debug!(last_active = %state.last_active_date, "restoring stored state");
                Self {
                    budget: TimeBudget::from_remaining(
                        &policy,
                        state.daily_remaining,
                        state.weekly_remaining,
                    ),
                    week: WeekState {
                        week_start: state.week_start_date,
                        day_index: state.current_day_index.min(policy.days_per_week).max(1),
                        phase: state.phase,
                    },
                    last_active: state.last_active_date,
                    sessions: state.sessions,
                    daily_plan: state.daily_plan,
                    tomorrow_plan: state.tomorrow_plan,
                    engine: SessionEngine::new(),
                    policy,
                    week_start_day,
                    store,
                    clock,
                }
            }
            None => {
                info!(%today, "no stored state; starting a fresh week");
                Self {
                    budget: TimeBudget::full(&policy),
                    week: WeekState::fresh(today, week_start_day),
                    last_active: today,
                    sessions: Vec::new(),
                    daily_plan: String::new(),
                    tomorrow_plan: None,
                    engine: SessionEngine::new(),
                    policy,
                    week_start_day,
                    store,
                    clock,
                }
            }
        };
        manager.roll_over()?;
        manager.week.reclassify(&manager.budget, &manager.policy);
        manager.save()?;
        Ok(manager)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &BudgetPolicy {
        &self.policy
    }

    pub fn budget(&self) -> &TimeBudget {
        &self.budget
    }

    pub fn week(&self) -> &WeekState {
        &self.week
    }

    pub fn phase(&self) -> WeekPhase {
        self.week.phase
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every record, most recent first.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn sessions_on(&self, date: NaiveDate) -> impl Iterator<Item = &SessionRecord> {
        self.sessions.iter().filter(move |r| r.date == date)
    }

    pub fn daily_plan(&self) -> &str {
        &self.daily_plan
    }

    pub fn tomorrow_plan(&self) -> Option<&str> {
        self.tomorrow_plan.as_deref()
    }

    pub fn is_available(&self, stage: Stage) -> bool {
        budget::available(stage, &self.budget, self.week.phase, &self.policy)
    }

    pub fn available_stages(&self) -> Vec<Stage> {
        budget::list_available(&self.budget, self.week.phase, &self.policy)
    }

    pub fn plan_for(&self, stage: Stage) -> SessionPlan {
        budget::plan(stage, &self.budget, &self.policy)
    }

    pub fn status(&self) -> StatusReport {
        let today = self.clock.today();
        StatusReport {
            date: today,
            week_start: self.week.week_start,
            day_index: self.week.day_index,
            phase: self.week.phase,
            daily_remaining: self.budget.daily_remaining(),
            weekly_remaining: *self.budget.weekly(),
            total_used: self.budget.total_used(),
            available_stages: self.available_stages(),
            session_state: self.engine.state(),
            daily_plan: self.daily_plan.clone(),
            tomorrow_plan: self.tomorrow_plan.clone(),
            sessions_today: self.sessions_on(today).count(),
        }
    }

    /// Live view of the session countdowns, or the budget when idle.
    pub fn snapshot(&self) -> Event {
        let active = self.engine.active();
        Event::StateSnapshot {
            state: self.engine.state(),
            stage: active.map(|s| s.stage),
            session_secs: active.map(|s| s.elapsed_secs).unwrap_or(0),
            daily_remaining: active
                .map(|s| s.daily_remaining)
                .unwrap_or_else(|| self.budget.daily_remaining()),
            weekly_remaining: active.map(|s| s.weekly_remaining).unwrap_or(0),
            may_stop_remaining: active.map(|s| s.may_stop_remaining).unwrap_or(0),
            must_stop_remaining: active.map(|s| s.must_stop_remaining).unwrap_or(0),
            phase: self.week.phase,
            at: Utc::now(),
        }
    }

    // ── Calendar ─────────────────────────────────────────────────────

    /// Apply any day or week change since the last active day.
    ///
    /// Deferred while a session is active so budgets never reset under it.
    pub fn roll_over(&mut self) -> Result<Option<Event>> {
        if !self.engine.is_idle() {
            return Ok(None);
        }
        let today = self.clock.today();
        let rollover = self
            .week
            .roll_over(self.last_active, today, self.week_start_day, &self.policy);
        let event = match rollover {
            Rollover::None => return Ok(None),
            Rollover::NewDay => {
                self.start_new_day();
                info!(%today, day_index = self.week.day_index, "new writing day");
                Event::DayRolledOver {
                    date: today,
                    day_index: self.week.day_index,
                    at: Utc::now(),
                }
            }
            Rollover::NewWeek => {
                self.start_new_day();
                self.budget.reset_weekly();
                info!(week_start = %self.week.week_start, "new writing week");
                Event::WeekRolledOver {
                    week_start: self.week.week_start,
                    at: Utc::now(),
                }
            }
        };
        self.last_active = today;
        self.week.reclassify(&self.budget, &self.policy);
        self.save()?;
        Ok(Some(event))
    }

    fn start_new_day(&mut self) {
        self.budget.reset_daily();
        self.daily_plan = self.tomorrow_plan.take().unwrap_or_default();
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Validate and begin a timed session.
    pub fn start(&mut self, request: StartRequest) -> Result<Event> {
        if !self.engine.is_idle() {
            return Err(ValidationError::SessionAlreadyActive.into());
        }
        let stage = request.stage.ok_or(ValidationError::MissingField("stage"))?;
        if request.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        self.roll_over()?;
        if self.budget.min_remaining(stage) == 0 {
            return Err(ValidationError::NoTimeRemaining(stage).into());
        }
        if !self.is_available(stage) {
            return Err(ValidationError::StageUnavailable(stage).into());
        }
        let plan = self.plan_for(stage);
        let seed = SessionSeed {
            stage,
            title: request.title,
            session_plan: request.session_plan,
            process_notes: request.process_notes,
            plan,
            started_at: self.clock.now(),
        };
        Ok(self.engine.start(seed, &self.budget)?)
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.engine.tick()
    }

    pub fn request_stop(&mut self) -> Result<(StopRequest, Event)> {
        Ok(self.engine.request_stop()?)
    }

    pub fn confirm_stop(&mut self) -> Option<Event> {
        self.engine.confirm_stop()
    }

    pub fn cancel_stop(&mut self) -> Option<Event> {
        self.engine.cancel_stop()
    }

    /// Add a line to the running session's process notes.
    pub fn append_process_note(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        let current = self
            .engine
            .active()
            .map(|s| s.process_notes.as_str())
            .ok_or(ValidationError::NoActiveSession)?;
        let notes = match (current.is_empty(), line.is_empty()) {
            (_, true) => return Ok(()),
            (true, false) => line.to_string(),
            (false, false) => format!("{current}\n{line}"),
        };
        Ok(self.engine.set_process_notes(notes)?)
    }

    /// Drop the active session without charging any time.
    pub fn discard(&mut self) -> Option<Event> {
        self.engine.reset()
    }

    /// Commit a stopped session: charge the budget, append the record,
    /// save, and return to idle.
    ///
    /// A session that never ticked leaves no record.
    pub fn finish(&mut self, reflection: Reflection) -> Result<Option<SessionRecord>> {
        reflection.validate()?;
        let session = self.engine.take_finished()?;
        if session.elapsed_secs == 0 {
            debug!(stage = %session.stage, "zero-length session dropped");
            return Ok(None);
        }

        self.budget.consume(session.stage, session.elapsed_secs);
        let record = SessionRecord::from_session(&session, reflection, self.clock.now());
        self.sessions.insert(0, record.clone());
        self.week.reclassify(&self.budget, &self.policy);
        self.save()?;
        info!(
            stage = %record.stage,
            duration_secs = record.duration_secs,
            daily_remaining = self.budget.daily_remaining(),
            "session committed"
        );
        Ok(Some(record))
    }

    /// Record a session done away from the timer.
    pub fn log_manual(&mut self, entry: ManualEntry) -> Result<SessionRecord> {
        let (stage, seconds, start) = entry.validate()?;
        if !self.engine.is_idle() {
            return Err(ValidationError::SessionAlreadyActive.into());
        }
        self.roll_over()?;

        let record = SessionRecord::manual(stage, &entry, seconds, start, self.clock.today());
        self.budget.consume(stage, seconds);
        self.sessions.insert(0, record.clone());
        self.week.reclassify(&self.budget, &self.policy);
        self.save()?;
        info!(%stage, duration_secs = seconds, "manual session logged");
        Ok(record)
    }

    /// Give time back after a mistaken manual log.
    pub fn credit(&mut self, stage: Stage, seconds: u64) -> Result<Event> {
        if !self.engine.is_idle() {
            return Err(ValidationError::SessionAlreadyActive.into());
        }
        self.budget.credit(stage, seconds);
        self.week.reclassify(&self.budget, &self.policy);
        self.save()?;
        info!(%stage, seconds, "budget credited");
        Ok(Event::BudgetCredited {
            stage,
            seconds,
            at: Utc::now(),
        })
    }

    // ── Plans ────────────────────────────────────────────────────────

    pub fn set_daily_plan(&mut self, plan: impl Into<String>) -> Result<()> {
        self.daily_plan = plan.into().trim().to_string();
        self.save()
    }

    /// Becomes the daily plan on the next new day.
    pub fn set_tomorrow_plan(&mut self, plan: impl Into<String>) -> Result<()> {
        let plan = plan.into().trim().to_string();
        self.tomorrow_plan = (!plan.is_empty()).then_some(plan);
        self.save()
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            daily_remaining: self.budget.daily_remaining(),
            weekly_remaining: *self.budget.weekly(),
            week_start_date: self.week.week_start,
            current_day_index: self.week.day_index,
            phase: self.week.phase,
            last_active_date: self.last_active,
            sessions: self.sessions.clone(),
            daily_plan: self.daily_plan.clone(),
            tomorrow_plan: self.tomorrow_plan.clone(),
        }
    }

    fn save(&mut self) -> Result<()> {
        let state = self.persisted();
        self.store.save_state(&state)
    }
}

impl<S: StateStore, C: Clock> TickSink for SessionManager<S, C> {
    fn on_tick(&mut self) -> Vec<Event> {
        self.tick()
    }

    fn accepts_ticks(&self) -> bool {
        self.engine.state() == SessionState::Running
    }
}
