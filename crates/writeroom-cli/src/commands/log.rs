use chrono::{Duration, Local, NaiveTime};
use clap::Args;
use writeroom_core::{Event, ManualEntry, Stage};

use super::{open_manager, print_json, CliResult};

#[derive(Args)]
pub struct LogArgs {
    stage: Stage,
    title: String,
    /// Length of the session in minutes
    #[arg(long)]
    minutes: u64,
    /// Start time as HH:MM; defaults to `minutes` before now
    #[arg(long, value_parser = parse_time)]
    start: Option<NaiveTime>,
    #[arg(long, default_value = "")]
    notes: String,
    /// How smoothly it went, 1-5
    #[arg(long)]
    fluency: Option<u8>,
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

pub fn run(args: LogArgs) -> CliResult {
    let start = args.start.unwrap_or_else(|| {
        // a start more than a day back wraps anyway
        let minutes = args.minutes.min(24 * 60) as i64;
        (Local::now() - Duration::minutes(minutes)).time()
    });
    let mut manager = open_manager()?;
    let record = manager.log_manual(ManualEntry {
        stage: Some(args.stage),
        title: args.title,
        duration_minutes: Some(args.minutes),
        start_time: Some(start),
        notes: args.notes,
        fluency: args.fluency,
    })?;
    print_json(&Event::recorded(&record))
}

pub fn history(today: bool, limit: Option<usize>) -> CliResult {
    let manager = open_manager()?;
    let date = Local::now().date_naive();
    let records: Vec<_> = manager
        .sessions()
        .iter()
        .filter(|r| !today || r.date == date)
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    print_json(&records)
}
