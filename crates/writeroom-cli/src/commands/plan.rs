use clap::Subcommand;
use serde_json::json;

use super::{open_manager, print_json, CliResult};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Replace today's plan
    Set { text: String },
    /// Print today's and tomorrow's plans
    Show,
    /// Plan for the next writing day
    Tomorrow { text: String },
}

pub fn run(action: PlanAction) -> CliResult {
    let mut manager = open_manager()?;
    match action {
        PlanAction::Set { text } => manager.set_daily_plan(text)?,
        PlanAction::Tomorrow { text } => manager.set_tomorrow_plan(text)?,
        PlanAction::Show => {}
    }
    print_json(&json!({
        "daily_plan": manager.daily_plan(),
        "tomorrow_plan": manager.tomorrow_plan(),
    }))
}
