//! The interactive session loop.
//!
//! Ticks, Ctrl-C and stdin race in one `select!`. A Ctrl-C inside the
//! minimum session length asks for a second Ctrl-C within a few seconds;
//! otherwise the session resumes. Each line typed while the session runs is
//! added to its process notes. Every event goes to stdout as JSON.
//!
//! Once the session stops, Ctrl-C (or end of input) during the reflection
//! prompts skips them.

use std::io::{self, Write};
use std::time::Duration;

use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use writeroom_core::{
    Event, Reflection, SessionState, Stage, StartRequest, StopRequest, TickSink, Ticker,
};

use super::{open_manager, print_json, CliResult, Manager};

const CONFIRM_WINDOW: Duration = Duration::from_secs(10);
const SNAPSHOT_EVERY: u64 = 60;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a timed session and run it in the foreground
    Start {
        stage: Stage,
        title: String,
        /// What you intend to do this session
        #[arg(long, default_value = "")]
        plan: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Finish without asking for fluency and next actions
        #[arg(long)]
        no_reflect: bool,
    },
}

pub fn run(action: SessionAction) -> CliResult {
    match action {
        SessionAction::Start {
            stage,
            title,
            plan,
            notes,
            no_reflect,
        } => {
            let request = StartRequest {
                stage: Some(stage),
                title,
                session_plan: plan,
                process_notes: notes,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run_session(request, no_reflect));
            // a pending stdin read would otherwise block shutdown
            runtime.shutdown_background();
            result
        }
    }
}

type Input = Lines<BufReader<Stdin>>;

async fn run_session(request: StartRequest, no_reflect: bool) -> CliResult {
    let mut manager = open_manager()?;
    print_json(&manager.start(request)?)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut ticker = Ticker::every_second();
    let mut ticks = 0u64;
    loop {
        match manager.engine().state() {
            SessionState::Running => {
                tokio::select! {
                    _ = ticker.next() => {
                        ticks += 1;
                        for event in manager.on_tick() {
                            print_json(&event)?;
                        }
                        if ticks % SNAPSHOT_EVERY == 0 && manager.accepts_ticks() {
                            print_json(&manager.snapshot())?;
                        }
                    }
                    _ = signal::ctrl_c() => {
                        let (request, event) = manager.request_stop()?;
                        print_json(&event)?;
                        if request == StopRequest::NeedsConfirmation {
                            eprintln!(
                                "minimum session length not reached; press Ctrl-C again within {}s to stop",
                                CONFIRM_WINDOW.as_secs()
                            );
                        }
                    }
                    line = input.next_line(), if input_open => match line? {
                        Some(line) => manager.append_process_note(&line)?,
                        None => input_open = false,
                    },
                }
            }
            SessionState::AwaitingConfirmation => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        if let Some(event) = manager.confirm_stop() {
                            print_json(&event)?;
                        }
                    }
                    _ = tokio::time::sleep(CONFIRM_WINDOW) => {
                        if let Some(event) = manager.cancel_stop() {
                            print_json(&event)?;
                        }
                        ticker.reset();
                    }
                }
            }
            SessionState::Stopped => break,
            SessionState::Idle => return Ok(()),
        }
    }

    let reflection = if no_reflect {
        Reflection::default()
    } else {
        tokio::select! {
            reflection = prompt_reflection(&mut input) => reflection?,
            _ = signal::ctrl_c() => {
                eprintln!();
                eprintln!("reflection skipped");
                Reflection::default()
            }
        }
    };
    finish(&mut manager, reflection)
}

fn finish(manager: &mut Manager, reflection: Reflection) -> CliResult {
    match manager.finish(reflection)? {
        Some(record) => print_json(&Event::recorded(&record)),
        None => {
            eprintln!("session ended before the first second; nothing recorded");
            Ok(())
        }
    }
}

async fn prompt_reflection(input: &mut Input) -> io::Result<Reflection> {
    let fluency = loop {
        let answer = prompt(input, "Fluency 1-5 (blank to skip): ").await?;
        if answer.is_empty() {
            break None;
        }
        match answer.parse::<u8>() {
            Ok(f) if (1..=5).contains(&f) => break Some(f),
            _ => eprintln!("enter a number from 1 to 5"),
        }
    };
    let next_actions = prompt(input, "Next actions: ").await?;
    Ok(Reflection {
        fluency,
        next_actions,
    })
}

async fn prompt(input: &mut Input, label: &str) -> io::Result<String> {
    eprint!("{label}");
    io::stderr().flush()?;
    let line = input.next_line().await?.unwrap_or_default();
    Ok(line.trim().to_string())
}
