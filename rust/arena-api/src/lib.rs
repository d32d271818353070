//! Arena API - a turn-based, timed debate engine behind a small HTTP API.
//!
//! A user argues for a position; the engine analyzes each argument with
//! keyword heuristics, picks a rebuttal strategy from a fixed catalog,
//! synthesizes a templated counterargument and has a coin-flip judge
//! score the round. Sessions run against two countdowns (a session clock
//! and a per-prompt clock) driven by per-session timer tasks.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum) → DebateEngine → analyze → select → synthesize → judge
//!                    │
//!                    └→ EventBus → SSE state-change feed
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod judge;
pub mod server;
pub mod session;
pub mod strategy;
pub mod synthesis;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::session::DebateEngine;

/// Shared application state for HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: DebateEngine,
}
