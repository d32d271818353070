//! Debate sessions: state aggregate, engine, countdown timers and the
//! end-of-session report.

pub mod engine;
pub(crate) mod report;
pub mod state;
pub(crate) mod timer;

pub use engine::{
    DebateEngine, RoundOutcome, StartOutcome, JUDGE_UNAVAILABLE_RULING, NO_RESPONSE_PLACEHOLDER,
    THINKING_STATUSES,
};
pub use state::{DebateSession, EndReason, Message, Round, Score, Sender, SessionPhase};
