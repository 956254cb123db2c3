use serde::Serialize;

use super::policy::BudgetPolicy;
use crate::stage::{Stage, StageMap};

/// Remaining seconds for today and for each stage this week.
///
/// Pure arithmetic: every operation saturates at zero or at the cap and
/// nothing here can fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBudget {
    daily_cap: u64,
    stage_cap: u64,
    daily_remaining: u64,
    weekly_remaining: StageMap<u64>,
}

impl TimeBudget {
    /// A budget with every counter at its cap.
    pub fn full(policy: &BudgetPolicy) -> Self {
        Self {
            daily_cap: policy.daily_cap_secs,
            stage_cap: policy.stage_weekly_cap_secs,
            daily_remaining: policy.daily_cap_secs,
            weekly_remaining: StageMap::splat(policy.stage_weekly_cap_secs),
        }
    }

    /// Rebuild from stored values, clamping anything above its cap.
    pub fn from_remaining(
        policy: &BudgetPolicy,
        daily_remaining: u64,
        weekly_remaining: StageMap<u64>,
    ) -> Self {
        let mut budget = Self::full(policy);
        budget.daily_remaining = daily_remaining.min(budget.daily_cap);
        for stage in Stage::ALL {
            *budget.weekly_remaining.get_mut(stage) =
                weekly_remaining.get(stage).min(budget.stage_cap);
        }
        budget
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn daily_remaining(&self) -> u64 {
        self.daily_remaining
    }

    pub fn weekly_remaining(&self, stage: Stage) -> u64 {
        self.weekly_remaining.get(stage)
    }

    pub fn weekly(&self) -> &StageMap<u64> {
        &self.weekly_remaining
    }

    pub fn daily_cap(&self) -> u64 {
        self.daily_cap
    }

    pub fn stage_cap(&self) -> u64 {
        self.stage_cap
    }

    /// Seconds spent on `stage` this week.
    pub fn stage_used(&self, stage: Stage) -> u64 {
        self.stage_cap
            .saturating_sub(self.weekly_remaining.get(stage))
    }

    /// Seconds spent this week across all stages.
    ///
    /// Always derived from the remaining values so the two cannot drift.
    pub fn total_used(&self) -> u64 {
        Stage::ALL.iter().map(|&s| self.stage_used(s)).sum()
    }

    /// The smaller of today's and this stage's remaining time.
    pub fn min_remaining(&self, stage: Stage) -> u64 {
        self.daily_remaining.min(self.weekly_remaining(stage))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn reset_daily(&mut self) {
        self.daily_remaining = self.daily_cap;
    }

    pub fn reset_weekly(&mut self) {
        self.weekly_remaining = StageMap::splat(self.stage_cap);
    }

    /// Spend `seconds` from today and from `stage`. Excess is absorbed.
    pub fn consume(&mut self, stage: Stage, seconds: u64) {
        self.daily_remaining = self.daily_remaining.saturating_sub(seconds);
        let weekly = self.weekly_remaining.get_mut(stage);
        *weekly = weekly.saturating_sub(seconds);
    }

    /// Give back `seconds` to today and to `stage`, never past either cap.
    pub fn credit(&mut self, stage: Stage, seconds: u64) {
        self.daily_remaining = self
            .daily_remaining
            .saturating_add(seconds)
            .min(self.daily_cap);
        let stage_cap = self.stage_cap;
        let weekly = self.weekly_remaining.get_mut(stage);
        *weekly = weekly.saturating_add(seconds).min(stage_cap);
    }
}
