mod engine;
mod ticker;

pub use engine::{
    ActiveSession, MustStopReason, SessionEngine, SessionSeed, SessionState, StopRequest,
};
pub use ticker::{TickSink, Ticker};
