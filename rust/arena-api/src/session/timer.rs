//! Per-session countdown task.
//!
//! One task per session ticks every second (configurable), decrements
//! both countdowns and drives the two timeout transitions: session
//! expiry ends the session, prompt expiry auto-submits the buffered
//! input. Ticks always take the session lock, so they serialize with
//! submits and ends; a tick that lands after the session ended is a
//! no-op.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::SessionEvent;
use crate::session::engine::{DebateEngine, SessionHandle, NO_RESPONSE_PLACEHOLDER};
use crate::session::state::{EndReason, Sender, SessionPhase};

/// Spawn the countdown task for a session.
pub(crate) fn spawn(
    engine: DebateEngine,
    session_id: String,
    handle: SessionHandle,
) -> JoinHandle<()> {
    let tick = Duration::from_millis(engine.timing().tick_interval_ms);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; skip it so the
        // countdown starts a full period after session start.
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut session = handle.state.lock().await;
            if session.is_ended() {
                break;
            }

            session.session_remaining_secs = session.session_remaining_secs.saturating_sub(1);
            let awaiting_user =
                session.phase == SessionPhase::AwaitingUser && session.turn == Sender::User;
            if awaiting_user {
                session.prompt_remaining_secs = session.prompt_remaining_secs.saturating_sub(1);
            }

            engine.events().broadcast(SessionEvent::TimeTick {
                session_id: session.id.clone(),
                session_remaining_secs: session.session_remaining_secs,
                prompt_remaining_secs: session.prompt_remaining_secs,
            });

            if session.session_remaining_secs == 0 {
                tracing::info!(session_id = %session_id, "session clock expired");
                engine.end_locked(&mut session, &handle, EndReason::Timeout);
                break;
            }

            if awaiting_user && session.prompt_remaining_secs == 0 {
                let text = if session.pending_input.trim().is_empty() {
                    NO_RESPONSE_PLACEHOLDER.to_string()
                } else {
                    session.pending_input.clone()
                };
                tracing::debug!(session_id = %session_id, "prompt expired, auto-submitting");
                if let Err(err) = engine.run_round(&mut session, &text).await {
                    tracing::warn!(session_id = %session_id, error = %err, "auto-submit failed");
                }
            }
        }
    })
}
