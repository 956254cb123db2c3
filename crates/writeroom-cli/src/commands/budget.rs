use serde::Serialize;
use writeroom_core::{SessionPlan, Stage};

use super::{open_manager, print_json, CliResult};

#[derive(Serialize)]
struct StageView {
    stage: Stage,
    available: bool,
    weekly_remaining: u64,
    plan: SessionPlan,
}

pub fn status() -> CliResult {
    let manager = open_manager()?;
    print_json(&manager.status())
}

pub fn stages() -> CliResult {
    let manager = open_manager()?;
    let views: Vec<StageView> = Stage::ALL
        .into_iter()
        .map(|stage| StageView {
            stage,
            available: manager.is_available(stage),
            weekly_remaining: manager.budget().weekly_remaining(stage),
            plan: manager.plan_for(stage),
        })
        .collect();
    print_json(&views)
}

pub fn plan(stage: Stage) -> CliResult {
    let manager = open_manager()?;
    print_json(&manager.plan_for(stage))
}

pub fn credit(stage: Stage, minutes: u64) -> CliResult {
    let mut manager = open_manager()?;
    let event = manager.credit(stage, minutes.saturating_mul(60))?;
    print_json(&event)
}
