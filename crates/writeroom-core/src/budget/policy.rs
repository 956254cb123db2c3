//! Product policy constants for budgets, the week phase and session length.
//!
//! Every constant lives here so the `[policy]` table of the config file can
//! override it. The defaults are the writing program's published rules and
//! should not change without a deliberate product decision.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPolicy {
    /// Seconds available per day across all stages.
    #[serde(default = "default_daily_cap")]
    pub daily_cap_secs: u64,
    /// Seconds available per stage per week.
    #[serde(default = "default_stage_weekly_cap")]
    pub stage_weekly_cap_secs: u64,
    /// Writing days per week.
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u8,
    /// Initial phase lasts while the day index is at most this...
    #[serde(default = "default_grace_days")]
    pub grace_days: u8,
    /// ...and total use this week is below this.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
    /// Share (percent) above which a stage counts as dominant in the back half.
    #[serde(default = "default_dominant_share")]
    pub dominant_share_pct: f64,
    /// Share (percent) below which a stage counts as starved in the back half.
    #[serde(default = "default_starved_share")]
    pub starved_share_pct: f64,
    /// Minimum session length; stopping sooner needs confirmation. Also the
    /// slice reserved for a follow-up session when less than an hour is left.
    #[serde(default = "default_may_stop_after")]
    pub may_stop_after_secs: u64,
    /// Longest single session. Inside the reserve window it is also the
    /// threshold above which a reserve slice is held back, so changing it
    /// moves both.
    #[serde(default = "default_max_session")]
    pub max_session_secs: u64,
    /// Below this much remaining time the planner stops using the fixed cap.
    #[serde(default = "default_reserve_window")]
    pub reserve_window_secs: u64,
}

fn default_daily_cap() -> u64 {
    4 * 3600
}
fn default_stage_weekly_cap() -> u64 {
    5 * 3600
}
fn default_days_per_week() -> u8 {
    5
}
fn default_grace_days() -> u8 {
    2
}
fn default_grace_secs() -> u64 {
    8 * 3600
}
fn default_dominant_share() -> f64 {
    35.0
}
fn default_starved_share() -> f64 {
    15.0
}
fn default_may_stop_after() -> u64 {
    600
}
fn default_max_session() -> u64 {
    3000
}
fn default_reserve_window() -> u64 {
    3600
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            daily_cap_secs: default_daily_cap(),
            stage_weekly_cap_secs: default_stage_weekly_cap(),
            days_per_week: default_days_per_week(),
            grace_days: default_grace_days(),
            grace_secs: default_grace_secs(),
            dominant_share_pct: default_dominant_share(),
            starved_share_pct: default_starved_share(),
            may_stop_after_secs: default_may_stop_after(),
            max_session_secs: default_max_session(),
            reserve_window_secs: default_reserve_window(),
        }
    }
}

impl BudgetPolicy {
    /// Sum of every stage's weekly cap.
    pub fn total_weekly_cap_secs(&self) -> u64 {
        self.stage_weekly_cap_secs
            .saturating_mul(Stage::ALL.len() as u64)
    }

    /// Reject combinations the budget rules cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(key: &str, message: &str) -> ConfigError {
            ConfigError::InvalidValue {
                key: format!("policy.{key}"),
                message: message.into(),
            }
        }

        if self.daily_cap_secs == 0 {
            return Err(invalid("daily_cap_secs", "must be greater than zero"));
        }
        if self.stage_weekly_cap_secs == 0 {
            return Err(invalid("stage_weekly_cap_secs", "must be greater than zero"));
        }
        if self.days_per_week == 0 || self.days_per_week > 7 {
            return Err(invalid("days_per_week", "must be between 1 and 7"));
        }
        if self.grace_days > self.days_per_week {
            return Err(invalid("grace_days", "cannot exceed days_per_week"));
        }
        for (key, pct) in [
            ("dominant_share_pct", self.dominant_share_pct),
            ("starved_share_pct", self.starved_share_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(invalid(key, "must be a percentage between 0 and 100"));
            }
        }
        if self.starved_share_pct >= self.dominant_share_pct {
            return Err(invalid(
                "starved_share_pct",
                "must be lower than dominant_share_pct",
            ));
        }
        if self.max_session_secs < self.may_stop_after_secs {
            return Err(invalid(
                "max_session_secs",
                "cannot be shorter than may_stop_after_secs",
            ));
        }
        if self.reserve_window_secs < self.max_session_secs {
            return Err(invalid(
                "reserve_window_secs",
                "cannot be shorter than max_session_secs",
            ));
        }
        Ok(())
    }
}
