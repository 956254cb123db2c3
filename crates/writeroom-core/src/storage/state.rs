//! The persisted state blob and the store abstraction behind it.
//!
//! Everything the session manager needs across runs is one JSON document
//! under one key. A missing document means first run; a malformed one is
//! logged and replaced with fresh defaults rather than surfaced as an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::budget::WeekPhase;
use crate::error::Result;
use crate::record::SessionRecord;
use crate::stage::StageMap;

/// Key of the single logical record.
pub const STATE_KEY: &str = "writing_timer_state";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub daily_remaining: u64,
    pub weekly_remaining: StageMap<u64>,
    pub week_start_date: NaiveDate,
    pub current_day_index: u8,
    #[serde(default)]
    pub phase: WeekPhase,
    pub last_active_date: NaiveDate,
    /// Most recent first.
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default)]
    pub daily_plan: String,
    #[serde(default)]
    pub tomorrow_plan: Option<String>,
}

/// Durable storage for the state blob.
pub trait StateStore {
    fn read_blob(&self) -> Result<Option<String>>;

    fn write_blob(&mut self, blob: &str) -> Result<()>;

    /// Load the state, or `None` when absent or unreadable.
    fn load_state(&self) -> Option<PersistedState> {
        let blob = match self.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read stored state; starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&blob) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "stored state is malformed; starting fresh");
                None
            }
        }
    }

    fn save_state(&mut self, state: &PersistedState) -> Result<()> {
        let blob = serde_json::to_string(state)?;
        self.write_blob(&blob)
    }
}

/// In-process store, for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw stored content, valid or not.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn read_blob(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write_blob(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistedState {
        PersistedState {
            daily_remaining: 11_400,
            weekly_remaining: StageMap {
                prewriting: 18_000,
                writing: 15_000,
                rewriting: 18_000,
                skillbuilding: 17_400,
            },
            week_start_date: NaiveDate::from_ymd_opt(2026, 10, 11).unwrap(),
            current_day_index: 3,
            phase: WeekPhase::FrontHalf,
            last_active_date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            sessions: Vec::new(),
            daily_plan: "finish chapter two".into(),
            tomorrow_plan: Some("outline chapter three".into()),
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert!(store.load_state().is_none());
        store.save_state(&sample()).unwrap();
        assert_eq!(store.load_state(), Some(sample()));
    }

    #[test]
    fn malformed_blob_loads_as_none() {
        assert!(MemoryStore::with_blob("{not json").load_state().is_none());
        assert!(MemoryStore::with_blob(r#"{"dailyRemaining": -5}"#)
            .load_state()
            .is_none());
    }

    #[test]
    fn blob_uses_camel_case_keys() {
        let mut store = MemoryStore::new();
        store.save_state(&sample()).unwrap();
        let json: serde_json::Value = serde_json::from_str(store.blob().unwrap()).unwrap();
        assert_eq!(json["dailyRemaining"], 11_400);
        assert_eq!(json["weeklyRemaining"]["writing"], 15_000);
        assert_eq!(json["phase"], "frontHalf");
    }
}
