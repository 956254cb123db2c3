mod availability;
mod phase;
mod planner;
mod policy;
mod time_budget;

pub use availability::{available, list_available, usage_shares};
pub use phase::WeekPhase;
pub use planner::{must_stop_after, plan, SessionPlan};
pub use policy::BudgetPolicy;
pub use time_budget::TimeBudget;
