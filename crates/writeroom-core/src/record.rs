use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::stage::Stage;
use crate::timer::ActiveSession;

/// A finished session. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub stage: Stage,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_secs: u64,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub notes: String,
    /// Self-rated flow, 1 (stuck) to 5 (effortless).
    #[serde(default)]
    pub fluency: Option<u8>,
    #[serde(default)]
    pub next_actions: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_manual: bool,
}

/// Post-session reflection collected before finalizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reflection {
    pub fluency: Option<u8>,
    pub next_actions: String,
}

impl Reflection {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fluency(self.fluency)
    }
}

/// A session logged by hand after the fact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    pub stage: Option<Stage>,
    pub title: String,
    pub duration_minutes: Option<u64>,
    pub start_time: Option<NaiveTime>,
    pub notes: String,
    pub fluency: Option<u8>,
}

impl ManualEntry {
    /// Check every required field; nothing is recorded on failure.
    pub fn validate(&self) -> Result<(Stage, u64, NaiveTime), ValidationError> {
        let stage = self.stage.ok_or(ValidationError::MissingField("stage"))?;
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let minutes = self
            .duration_minutes
            .filter(|m| *m > 0)
            .ok_or(ValidationError::MissingField("duration"))?;
        let start = self.start_time.ok_or(ValidationError::MissingField("start_time"))?;
        validate_fluency(self.fluency)?;
        Ok((stage, minutes.saturating_mul(60), start))
    }
}

fn validate_fluency(fluency: Option<u8>) -> Result<(), ValidationError> {
    match fluency {
        Some(f) if !(1..=5).contains(&f) => Err(ValidationError::InvalidValue {
            field: "fluency".into(),
            message: format!("{f} is outside 1-5"),
        }),
        _ => Ok(()),
    }
}

impl SessionRecord {
    /// Record for a timed session ending at `ended_at`.
    pub fn from_session(session: &ActiveSession, reflection: Reflection, ended_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: session.stage,
            title: session.title.clone(),
            start_time: session.started_at,
            end_time: ended_at,
            duration_secs: session.elapsed_secs,
            plan: session.session_plan.clone(),
            notes: session.process_notes.clone(),
            fluency: reflection.fluency,
            next_actions: reflection.next_actions,
            date: ended_at.date(),
            is_manual: false,
        }
    }

    /// Record for a validated manual entry on `day`.
    pub fn manual(
        stage: Stage,
        entry: &ManualEntry,
        duration_secs: u64,
        start: NaiveTime,
        day: NaiveDate,
    ) -> Self {
        let start_time = day.and_time(start);
        Self {
            id: Uuid::new_v4(),
            stage,
            title: entry.title.trim().to_string(),
            start_time,
            end_time: end_after(start_time, duration_secs),
            duration_secs,
            plan: String::new(),
            notes: entry.notes.clone(),
            fluency: entry.fluency,
            next_actions: String::new(),
            date: day,
            is_manual: true,
        }
    }
}

/// `start + secs`, clamped to the latest representable time.
fn end_after(start: NaiveDateTime, secs: u64) -> NaiveDateTime {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|d| start.checked_add_signed(d))
        .unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ManualEntry {
        ManualEntry {
            stage: Some(Stage::Rewriting),
            title: "Essay".into(),
            duration_minutes: Some(45),
            start_time: NaiveTime::from_hms_opt(14, 5, 0),
            notes: "cut the intro".into(),
            fluency: Some(4),
        }
    }

    #[test]
    fn manual_entry_requires_every_field() {
        assert!(entry().validate().is_ok());

        let missing_stage = ManualEntry { stage: None, ..entry() };
        assert_eq!(
            missing_stage.validate(),
            Err(ValidationError::MissingField("stage"))
        );
        let blank_title = ManualEntry { title: " ".into(), ..entry() };
        assert_eq!(blank_title.validate(), Err(ValidationError::EmptyTitle));
        let zero = ManualEntry { duration_minutes: Some(0), ..entry() };
        assert_eq!(zero.validate(), Err(ValidationError::MissingField("duration")));
        let no_start = ManualEntry { start_time: None, ..entry() };
        assert_eq!(
            no_start.validate(),
            Err(ValidationError::MissingField("start_time"))
        );
        let bad_fluency = ManualEntry { fluency: Some(9), ..entry() };
        assert!(bad_fluency.validate().is_err());
    }

    #[test]
    fn manual_record_spans_its_duration() {
        let e = entry();
        let (stage, secs, start) = e.validate().unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let record = SessionRecord::manual(stage, &e, secs, start, day);
        assert_eq!(record.duration_secs, 2_700);
        assert_eq!(record.end_time.time(), NaiveTime::from_hms_opt(14, 50, 0).unwrap());
        assert!(record.is_manual);
        assert!(record.plan.is_empty());
    }

    #[test]
    fn huge_manual_duration_clamps_end_time() {
        let e = ManualEntry {
            duration_minutes: Some(u64::MAX),
            ..entry()
        };
        let (stage, secs, start) = e.validate().unwrap();
        assert_eq!(secs, u64::MAX);
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let record = SessionRecord::manual(stage, &e, secs, start, day);
        assert_eq!(record.end_time, NaiveDateTime::MAX);
        assert!(record.end_time > record.start_time);
    }
}
