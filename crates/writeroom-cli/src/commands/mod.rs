pub mod budget;
pub mod config;
pub mod log;
pub mod plan;
pub mod session;

use serde::Serialize;
use writeroom_core::{Config, Database, SessionManager, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Manager = SessionManager<Database, SystemClock>;

/// Open the on-disk state with the configured policy.
pub fn open_manager() -> Result<Manager, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let week_start = config.calendar.week_start_day()?;
    let db = Database::open()?;
    Ok(SessionManager::open(config.policy, week_start, db, SystemClock)?)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
