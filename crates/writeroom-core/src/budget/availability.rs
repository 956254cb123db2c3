//! Which stages may be offered for a new session.
//!
//! A stage is hidden when its own time is gone, when today's time is gone,
//! or (back half only) when it dominates the week while another stage is
//! being starved. Popularity alone never hides a stage.

use super::phase::WeekPhase;
use super::policy::BudgetPolicy;
use super::time_budget::TimeBudget;
use crate::stage::{Stage, StageMap};

/// Each stage's percentage of the time used this week.
///
/// `None` when nothing has been used yet.
pub fn usage_shares(budget: &TimeBudget) -> Option<StageMap<f64>> {
    let total = budget.total_used();
    if total == 0 {
        return None;
    }
    let mut shares = StageMap::splat(0.0);
    for stage in Stage::ALL {
        *shares.get_mut(stage) = budget.stage_used(stage) as f64 / total as f64 * 100.0;
    }
    Some(shares)
}

pub fn available(stage: Stage, budget: &TimeBudget, phase: WeekPhase, policy: &BudgetPolicy) -> bool {
    if budget.weekly_remaining(stage) == 0 || budget.daily_remaining() == 0 {
        return false;
    }
    if !phase.balance_active() {
        return true;
    }

    let Some(shares) = usage_shares(budget) else {
        return true;
    };
    if shares.get(stage) <= policy.dominant_share_pct {
        return true;
    }
    let other_starved = shares
        .iter()
        .any(|(other, share)| other != stage && share < policy.starved_share_pct);
    !other_starved
}

/// Stages passing [`available`], in declaration order.
pub fn list_available(budget: &TimeBudget, phase: WeekPhase, policy: &BudgetPolicy) -> Vec<Stage> {
    Stage::ALL
        .into_iter()
        .filter(|&s| available(s, budget, phase, policy))
        .collect()
}
