//! Session engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read the wall clock to advance - the caller (a ticker) is
//! responsible for calling `tick()` once per elapsed second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Stopped -> Idle
//!            |  ^
//!            v  |
//!   AwaitingConfirmation -> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.start(seed)?;
//! // Once per second:
//! for event in engine.tick() { /* MayStop / MustStop */ }
//! ```

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::budget::{SessionPlan, TimeBudget};
use crate::error::ValidationError;
use crate::events::Event;
use crate::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    /// An early stop is waiting for the writer to confirm. Ticks are held.
    AwaitingConfirmation,
    /// Ended and waiting to be finalized. Ticks are ignored.
    Stopped,
}

/// Why a session was force-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MustStopReason {
    SessionCap,
    DailyBudgetExhausted,
    WeeklyBudgetExhausted,
}

/// Result of a manual stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// Still inside the minimum session length with budget left; call
    /// `confirm_stop` or `cancel_stop`.
    NeedsConfirmation,
    /// The session is stopped and can be finalized.
    Ready,
}

/// Everything needed to begin a session.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub stage: Stage,
    pub title: String,
    pub session_plan: String,
    pub process_notes: String,
    pub plan: SessionPlan,
    pub started_at: NaiveDateTime,
}

/// The running session and its independent countdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSession {
    pub stage: Stage,
    pub title: String,
    pub session_plan: String,
    pub process_notes: String,
    pub started_at: NaiveDateTime,
    pub plan: SessionPlan,
    pub elapsed_secs: u64,
    pub daily_remaining: u64,
    pub weekly_remaining: u64,
    pub may_stop_remaining: u64,
    pub must_stop_remaining: u64,
    #[serde(default)]
    pub must_stop_reason: Option<MustStopReason>,
    #[serde(default)]
    pub stopped_early: bool,
    #[serde(default)]
    may_stop_announced: bool,
}

impl ActiveSession {
    fn in_grace(&self) -> bool {
        self.may_stop_remaining > 0
    }

    fn has_budget_left(&self) -> bool {
        self.daily_remaining > 0 && self.weekly_remaining > 0
    }

    fn exhausted(&self) -> Option<MustStopReason> {
        if self.must_stop_remaining == 0 {
            Some(MustStopReason::SessionCap)
        } else if self.daily_remaining == 0 {
            Some(MustStopReason::DailyBudgetExhausted)
        } else if self.weekly_remaining == 0 {
            Some(MustStopReason::WeeklyBudgetExhausted)
        } else {
            None
        }
    }
}

/// Core session engine.
///
/// Holds at most one session. Budget counters tick down on the session's
/// own copies; the real [`TimeBudget`] is only charged when the session is
/// finalized.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    state: SessionState,
    active: Option<ActiveSession>,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            active: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session, seeding countdowns from the plan and the budget.
    ///
    /// Availability is the caller's concern; this only guards the engine's
    /// own invariants.
    pub fn start(&mut self, seed: SessionSeed, budget: &TimeBudget) -> Result<Event, ValidationError> {
        if !self.is_idle() {
            return Err(ValidationError::SessionAlreadyActive);
        }
        let title = seed.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if seed.plan.is_empty() {
            return Err(ValidationError::NoTimeRemaining(seed.stage));
        }

        let session = ActiveSession {
            stage: seed.stage,
            title: title.to_string(),
            session_plan: seed.session_plan,
            process_notes: seed.process_notes,
            started_at: seed.started_at,
            plan: seed.plan,
            elapsed_secs: 0,
            daily_remaining: budget.daily_remaining(),
            weekly_remaining: budget.weekly_remaining(seed.stage),
            may_stop_remaining: seed.plan.may_stop_after,
            must_stop_remaining: seed.plan.must_stop_after,
            must_stop_reason: None,
            stopped_early: false,
            may_stop_announced: false,
        };
        debug!(
            stage = %session.stage,
            must_stop_after = session.plan.must_stop_after,
            "session started"
        );
        let event = Event::SessionStarted {
            stage: session.stage,
            title: session.title.clone(),
            plan: session.plan,
            at: Utc::now(),
        };
        self.active = Some(session);
        self.state = SessionState::Running;
        Ok(event)
    }

    /// Apply one elapsed second. Returns threshold events crossed by it.
    ///
    /// Ticks outside `Running` are ignored and change nothing.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != SessionState::Running {
            return events;
        }
        let Some(session) = self.active.as_mut() else {
            return events;
        };

        session.elapsed_secs += 1;
        session.daily_remaining = session.daily_remaining.saturating_sub(1);
        session.weekly_remaining = session.weekly_remaining.saturating_sub(1);
        session.may_stop_remaining = session.may_stop_remaining.saturating_sub(1);
        session.must_stop_remaining = session.must_stop_remaining.saturating_sub(1);

        if session.may_stop_remaining == 0 && !session.may_stop_announced {
            session.may_stop_announced = true;
            events.push(Event::MayStop {
                stage: session.stage,
                session_secs: session.elapsed_secs,
                at: Utc::now(),
            });
        }

        if let Some(reason) = session.exhausted() {
            session.must_stop_reason = Some(reason);
            debug!(stage = %session.stage, ?reason, secs = session.elapsed_secs, "must stop");
            events.push(Event::MustStop {
                stage: session.stage,
                reason,
                session_secs: session.elapsed_secs,
                at: Utc::now(),
            });
            self.state = SessionState::Stopped;
        }
        events
    }

    /// Ask to end the session early or normally.
    pub fn request_stop(&mut self) -> Result<(StopRequest, Event), ValidationError> {
        let session = self.active.as_ref().ok_or(ValidationError::NoActiveSession)?;
        match self.state {
            SessionState::Running if session.in_grace() && session.has_budget_left() => {
                self.state = SessionState::AwaitingConfirmation;
                let event = Event::EarlyStopRequested {
                    stage: session.stage,
                    session_secs: session.elapsed_secs,
                    may_stop_remaining: session.may_stop_remaining,
                    at: Utc::now(),
                };
                Ok((StopRequest::NeedsConfirmation, event))
            }
            SessionState::Running => {
                self.state = SessionState::Stopped;
                Ok((StopRequest::Ready, Self::stopped_event(session)))
            }
            SessionState::AwaitingConfirmation => {
                let event = Event::EarlyStopRequested {
                    stage: session.stage,
                    session_secs: session.elapsed_secs,
                    may_stop_remaining: session.may_stop_remaining,
                    at: Utc::now(),
                };
                Ok((StopRequest::NeedsConfirmation, event))
            }
            SessionState::Stopped => Ok((StopRequest::Ready, Self::stopped_event(session))),
            SessionState::Idle => Err(ValidationError::NoActiveSession),
        }
    }

    /// Accept a pending early stop.
    pub fn confirm_stop(&mut self) -> Option<Event> {
        if self.state != SessionState::AwaitingConfirmation {
            return None;
        }
        let session = self.active.as_mut()?;
        session.stopped_early = true;
        self.state = SessionState::Stopped;
        Some(Self::stopped_event(session))
    }

    /// Withdraw a pending early stop and keep running.
    pub fn cancel_stop(&mut self) -> Option<Event> {
        if self.state != SessionState::AwaitingConfirmation {
            return None;
        }
        let session = self.active.as_ref()?;
        self.state = SessionState::Running;
        Some(Event::StopCancelled {
            stage: session.stage,
            session_secs: session.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Replace the running notes.
    pub fn set_process_notes(&mut self, notes: String) -> Result<(), ValidationError> {
        let session = self.active.as_mut().ok_or(ValidationError::NoActiveSession)?;
        session.process_notes = notes;
        Ok(())
    }

    /// Hand over a stopped session for finalization and return to `Idle`.
    pub fn take_finished(&mut self) -> Result<ActiveSession, ValidationError> {
        match self.state {
            SessionState::Stopped => {}
            SessionState::Idle => return Err(ValidationError::NoActiveSession),
            SessionState::Running | SessionState::AwaitingConfirmation => {
                return Err(ValidationError::SessionNotStopped)
            }
        }
        let session = self.active.take().ok_or(ValidationError::NoActiveSession)?;
        self.state = SessionState::Idle;
        Ok(session)
    }

    /// Drop the active session without committing anything.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = SessionState::Idle;
        let session = self.active.take()?;
        debug!(stage = %session.stage, secs = session.elapsed_secs, "session discarded");
        Some(Event::SessionDiscarded {
            stage: session.stage,
            session_secs: session.elapsed_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stopped_event(session: &ActiveSession) -> Event {
        Event::SessionStopped {
            stage: session.stage,
            session_secs: session.elapsed_secs,
            early: session.stopped_early,
            at: Utc::now(),
        }
    }
}
