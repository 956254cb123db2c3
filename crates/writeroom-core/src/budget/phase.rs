//! Week phase classification.
//!
//! ```text
//! initial   -- first `grace_days` days while under `grace_secs` of use
//! frontHalf -- enough days remain to absorb what has been used so far
//! backHalf  -- remaining days can no longer outweigh time already used;
//!              the balance policy is active
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::policy::BudgetPolicy;
use super::time_budget::TimeBudget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum WeekPhase {
    #[default]
    Initial,
    FrontHalf,
    BackHalf,
}

impl WeekPhase {
    /// Classify the week from the budget's derived total and the day index.
    pub fn classify(budget: &TimeBudget, day_index: u8, policy: &BudgetPolicy) -> Self {
        Self::classify_used(budget.total_used(), day_index, policy)
    }

    /// Classification from an already-derived weekly total.
    pub fn classify_used(total_used: u64, day_index: u8, policy: &BudgetPolicy) -> Self {
        if day_index <= policy.grace_days && total_used < policy.grace_secs {
            return WeekPhase::Initial;
        }

        let days_remaining = (policy.days_per_week as u64 + 1).saturating_sub(day_index as u64);
        let max_possible_remaining = days_remaining.saturating_mul(policy.daily_cap_secs);
        if max_possible_remaining <= total_used {
            WeekPhase::BackHalf
        } else {
            WeekPhase::FrontHalf
        }
    }

    pub fn balance_active(self) -> bool {
        self == WeekPhase::BackHalf
    }
}

impl fmt::Display for WeekPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeekPhase::Initial => "initial",
            WeekPhase::FrontHalf => "frontHalf",
            WeekPhase::BackHalf => "backHalf",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;

    fn policy() -> BudgetPolicy {
        BudgetPolicy::default()
    }

    #[test]
    fn early_light_week_is_initial() {
        assert_eq!(WeekPhase::classify_used(0, 1, &policy()), WeekPhase::Initial);
        assert_eq!(
            WeekPhase::classify_used(28_799, 2, &policy()),
            WeekPhase::Initial
        );
    }

    #[test]
    fn grace_ends_at_eight_hours() {
        // day 2: 4 days left -> 57600 possible, far above 28800 used
        assert_eq!(
            WeekPhase::classify_used(28_800, 2, &policy()),
            WeekPhase::FrontHalf
        );
    }

    #[test]
    fn grace_ends_after_day_two() {
        assert_eq!(WeekPhase::classify_used(0, 3, &policy()), WeekPhase::FrontHalf);
    }

    #[test]
    fn back_half_when_remaining_days_cannot_outweigh_usage() {
        // day 4: 2 days left -> 28800 possible
        assert_eq!(
            WeekPhase::classify_used(28_800, 4, &policy()),
            WeekPhase::BackHalf
        );
        assert_eq!(
            WeekPhase::classify_used(28_799, 4, &policy()),
            WeekPhase::FrontHalf
        );
        // day 5: 1 day left -> 14400 possible
        assert_eq!(
            WeekPhase::classify_used(19_800, 5, &policy()),
            WeekPhase::BackHalf
        );
    }

    #[test]
    fn days_past_the_week_are_back_half() {
        assert_eq!(WeekPhase::classify_used(0, 6, &policy()), WeekPhase::BackHalf);
    }

    #[test]
    fn classify_derives_total_from_budget() {
        let p = policy();
        let mut budget = TimeBudget::full(&p);
        budget.consume(Stage::Prewriting, 14_400);
        budget.reset_daily();
        budget.consume(Stage::Writing, 1_800);
        budget.consume(Stage::Rewriting, 1_800);
        budget.consume(Stage::Skillbuilding, 1_800);
        assert_eq!(budget.total_used(), 19_800);
        assert_eq!(WeekPhase::classify(&budget, 5, &p), WeekPhase::BackHalf);
        assert_eq!(
            WeekPhase::classify(&budget, 5, &p),
            WeekPhase::classify_used(budget.total_used(), 5, &p)
        );
    }

    #[test]
    fn serializes_in_camel_case() {
        assert_eq!(
            serde_json::to_string(&WeekPhase::FrontHalf).unwrap(),
            "\"frontHalf\""
        );
        assert_eq!(WeekPhase::BackHalf.to_string(), "backHalf");
    }
}
