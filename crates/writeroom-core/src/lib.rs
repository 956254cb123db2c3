//! # Writeroom Core Library
//!
//! Time budgeting for writers. Writing time is split across four stages
//! (prewriting, writing, rewriting, skillbuilding), each with a weekly cap,
//! under a shared daily cap. Sessions are sized from what is left and the
//! week's phase decides whether dominant stages are held back.
//!
//! ## Architecture
//!
//! - **Budget**: pure arithmetic over remaining seconds, phase
//!   classification, stage availability and session sizing
//! - **Timer**: a tick-driven session state machine plus a tokio ticker
//! - **Session manager**: owns budgets, week state and history, and writes
//!   every committed change through a [`StateStore`]
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionManager`]: the aggregate callers drive
//! - [`SessionEngine`]: session state machine
//! - [`TimeBudget`]: remaining daily and weekly seconds
//! - [`Config`]: policy and calendar settings

pub mod budget;
pub mod error;
pub mod events;
pub mod record;
pub mod session;
pub mod stage;
pub mod storage;
pub mod timer;
pub mod week;

pub use budget::{BudgetPolicy, SessionPlan, TimeBudget, WeekPhase};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::Event;
pub use record::{ManualEntry, Reflection, SessionRecord};
pub use session::{SessionManager, StartRequest, StatusReport};
pub use stage::{Stage, StageMap};
pub use storage::{CalendarConfig, Config, Database, MemoryStore, PersistedState, StateStore};
pub use timer::{MustStopReason, SessionEngine, SessionState, StopRequest, TickSink, Ticker};
pub use week::{Clock, FixedClock, SystemClock, WeekState};
