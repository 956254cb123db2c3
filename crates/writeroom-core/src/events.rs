use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::budget::{SessionPlan, WeekPhase};
use crate::record::SessionRecord;
use crate::stage::Stage;
use crate::timer::{MustStopReason, SessionState};

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; callers react to the threshold ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        stage: Stage,
        title: String,
        plan: SessionPlan,
        at: DateTime<Utc>,
    },
    /// The minimum session length has been reached; stopping is now free.
    MayStop {
        stage: Stage,
        session_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was force-ended and must be finalized.
    MustStop {
        stage: Stage,
        reason: MustStopReason,
        session_secs: u64,
        at: DateTime<Utc>,
    },
    /// A stop was requested inside the minimum session length.
    EarlyStopRequested {
        stage: Stage,
        session_secs: u64,
        may_stop_remaining: u64,
        at: DateTime<Utc>,
    },
    /// The early stop was withdrawn and the session keeps running.
    StopCancelled {
        stage: Stage,
        session_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        stage: Stage,
        session_secs: u64,
        early: bool,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        record_id: Uuid,
        stage: Stage,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The active session was dropped without being committed.
    SessionDiscarded {
        stage: Stage,
        session_secs: u64,
        at: DateTime<Utc>,
    },
    ManualSessionLogged {
        record_id: Uuid,
        stage: Stage,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BudgetCredited {
        stage: Stage,
        seconds: u64,
        at: DateTime<Utc>,
    },
    DayRolledOver {
        date: NaiveDate,
        day_index: u8,
        at: DateTime<Utc>,
    },
    WeekRolledOver {
        week_start: NaiveDate,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        stage: Option<Stage>,
        session_secs: u64,
        daily_remaining: u64,
        weekly_remaining: u64,
        may_stop_remaining: u64,
        must_stop_remaining: u64,
        phase: WeekPhase,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The commit event for a freshly stored record.
    pub fn recorded(record: &SessionRecord) -> Self {
        let (record_id, stage, duration_secs, at) =
            (record.id, record.stage, record.duration_secs, Utc::now());
        if record.is_manual {
            Event::ManualSessionLogged { record_id, stage, duration_secs, at }
        } else {
            Event::SessionCompleted { record_id, stage, duration_secs, at }
        }
    }
}
