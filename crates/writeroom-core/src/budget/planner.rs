use serde::{Deserialize, Serialize};

use super::policy::BudgetPolicy;
use super::time_budget::TimeBudget;
use crate::stage::Stage;

/// Bounds for one session, in seconds from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Stopping before this needs confirmation.
    pub may_stop_after: u64,
    /// The session is force-ended here.
    pub must_stop_after: u64,
}

impl SessionPlan {
    /// A zero-length plan; the caller must not start a session with it.
    pub fn is_empty(&self) -> bool {
        self.must_stop_after == 0
    }
}

/// Plan a session for `stage` from what is left today and this week.
pub fn plan(stage: Stage, budget: &TimeBudget, policy: &BudgetPolicy) -> SessionPlan {
    SessionPlan {
        may_stop_after: policy.may_stop_after_secs,
        must_stop_after: must_stop_after(budget.min_remaining(stage), policy),
    }
}

/// Session cap for a given amount of remaining time.
pub fn must_stop_after(min_remaining: u64, policy: &BudgetPolicy) -> u64 {
    let reserve = policy.may_stop_after_secs;
    if min_remaining <= reserve {
        min_remaining
    } else if min_remaining < policy.reserve_window_secs {
        if min_remaining > policy.max_session_secs {
            // leave a short follow-up session instead of draining the hour
            (min_remaining - reserve).min(policy.max_session_secs)
        } else {
            min_remaining
        }
    } else {
        policy.max_session_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageMap;

    #[test]
    fn boundary_table() {
        let policy = BudgetPolicy::default();
        for (remaining, expected) in [
            (0, 0),
            (500, 500),
            (600, 600),
            (601, 601),
            (1_800, 1_800),
            (3_000, 3_000),
            (3_001, 2_401),
            (3_200, 2_600),
            (3_599, 2_999),
            (3_600, 3_000),
            (7_200, 3_000),
        ] {
            assert_eq!(
                must_stop_after(remaining, &policy),
                expected,
                "min_remaining = {remaining}"
            );
        }
    }

    #[test]
    fn plan_uses_the_smaller_budget() {
        let policy = BudgetPolicy::default();
        let mut weekly = StageMap::splat(18_000);
        weekly.rewriting = 1_800;
        let budget = TimeBudget::from_remaining(&policy, 3_200, weekly);

        let writing = plan(Stage::Writing, &budget, &policy);
        assert_eq!(writing.may_stop_after, 600);
        assert_eq!(writing.must_stop_after, 2_600);

        let rewriting = plan(Stage::Rewriting, &budget, &policy);
        assert_eq!(rewriting.must_stop_after, 1_800);
    }

    #[test]
    fn exhausted_budget_plans_an_empty_session() {
        let policy = BudgetPolicy::default();
        let mut budget = TimeBudget::full(&policy);
        budget.consume(Stage::Writing, 14_400);
        assert!(plan(Stage::Writing, &budget, &policy).is_empty());
    }

    #[test]
    fn shorter_session_cap_also_moves_the_reserve_band() {
        let policy = BudgetPolicy {
            max_session_secs: 1_500,
            ..BudgetPolicy::default()
        };
        for (remaining, expected) in [
            (1_500, 1_500),
            (1_600, 1_000),
            (2_000, 1_400),
            (3_200, 1_500),
            (3_600, 1_500),
        ] {
            assert_eq!(
                must_stop_after(remaining, &policy),
                expected,
                "min_remaining = {remaining}"
            );
        }
    }
}
