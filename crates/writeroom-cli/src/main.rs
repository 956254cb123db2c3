use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use writeroom_core::Stage;

mod commands;

#[derive(Parser)]
#[command(name = "writeroom", version, about = "Writeroom: stage time budgets for writers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Budget, week phase and session state as JSON
    Status,
    /// Every stage with its availability and session plan
    Stages,
    /// Session plan for one stage
    Plan {
        /// prewriting, writing, rewriting or skillbuilding
        stage: Stage,
    },
    /// Timed writing sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Log a session done away from the timer
    Log(commands::log::LogArgs),
    /// Give back time from a mistaken log
    Credit {
        stage: Stage,
        /// Minutes to return
        #[arg(long)]
        minutes: u64,
    },
    /// Recorded sessions, most recent first
    History {
        /// Only sessions from today
        #[arg(long)]
        today: bool,
        /// Maximum number of records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Today's and tomorrow's plans
    DailyPlan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("WRITEROOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status => commands::budget::status(),
        Commands::Stages => commands::budget::stages(),
        Commands::Plan { stage } => commands::budget::plan(stage),
        Commands::Session { action } => commands::session::run(action),
        Commands::Log(args) => commands::log::run(args),
        Commands::Credit { stage, minutes } => commands::budget::credit(stage, minutes),
        Commands::History { today, limit } => commands::log::history(today, limit),
        Commands::DailyPlan { action } => commands::plan::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
