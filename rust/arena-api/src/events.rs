//! Session event bus for real-time state-change streaming.
//!
//! Every engine transition broadcasts a `SessionEvent` on a per-session
//! channel; the SSE endpoint bridges subscribers onto HTTP.
//!
//! # Architecture
//!
//! ```text
//! DebateEngine → EventBus::broadcast(event) → [SSE client 1, SSE client 2, ...]
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::state::{EndReason, Sender};

/// Per-session channel capacity.
///
/// A subscriber that falls more than 64 events behind starts losing the
/// oldest ones and sees `RecvError::Lagged`.
const CHANNEL_CAPACITY: usize = 64;

/// State-change events emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session created and the opening exchange recorded.
    SessionStarted {
        session_id: String,
        topic: String,
        room: String,
        #[serde(with = "chrono::serde::ts_seconds")]
        timestamp: DateTime<Utc>,
    },

    /// A user argument was accepted and a round opened.
    UserSubmitted {
        session_id: String,
        round: u32,
        text: String,
        #[serde(with = "chrono::serde::ts_seconds")]
        timestamp: DateTime<Utc>,
    },

    /// The response pipeline started; `status` is the rotating
    /// thinking-status line.
    AgentThinking {
        session_id: String,
        round: u32,
        status: String,
    },

    /// The agent's rebuttal was appended to the transcript.
    AgentReplied {
        session_id: String,
        round: u32,
        text: String,
        strategy: String,
        confidence: f32,
        #[serde(with = "chrono::serde::ts_seconds")]
        timestamp: DateTime<Utc>,
    },

    /// The round was adjudicated. `winner` is absent when the judge
    /// failed and nobody scored.
    RoundJudged {
        session_id: String,
        round: u32,
        winner: Option<Sender>,
        ruling: String,
        user_points: u32,
        agent_points: u32,
    },

    /// The prompt countdown was reset for the user's next turn.
    PromptReset {
        session_id: String,
        prompt_remaining_secs: u64,
    },

    /// One-second countdown tick.
    TimeTick {
        session_id: String,
        session_remaining_secs: u64,
        prompt_remaining_secs: u64,
    },

    /// Terminal transition; carries the cached final report.
    SessionEnded {
        session_id: String,
        reason: EndReason,
        final_report: String,
        #[serde(with = "chrono::serde::ts_seconds")]
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// The session this event belongs to.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionStarted { session_id, .. }
            | Self::UserSubmitted { session_id, .. }
            | Self::AgentThinking { session_id, .. }
            | Self::AgentReplied { session_id, .. }
            | Self::RoundJudged { session_id, .. }
            | Self::PromptReset { session_id, .. }
            | Self::TimeTick { session_id, .. }
            | Self::SessionEnded { session_id, .. } => session_id,
        }
    }
}

/// Per-session pub/sub channels.
///
/// Channels are created lazily on first subscribe or broadcast and torn
/// down when the session ends.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<SessionEvent>>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a session's events, creating the channel if needed.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<SessionEvent> {
        let mut channels = self.channels.write();
        let sender = channels.entry(session_id.to_string()).or_insert_with(|| {
            let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
            tx
        });
        sender.subscribe()
    }

    /// Broadcast an event to a session's subscribers.
    ///
    /// Events are ephemeral: with no channel yet, one is created so
    /// later subscribers can attach, and the event itself is dropped.
    pub fn broadcast(&self, event: SessionEvent) {
        let session_id = event.session_id().to_string();
        {
            let channels = self.channels.read();
            if let Some(sender) = channels.get(&session_id) {
                let _ = sender.send(event);
                return;
            }
        }
        let mut channels = self.channels.write();
        let sender = channels.entry(session_id).or_insert_with(|| {
            let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
            tx
        });
        let _ = sender.send(event);
    }

    /// Drop the channel for an ended session. Remaining subscribers
    /// drain buffered events, then see `RecvError::Closed`.
    pub fn cleanup(&self, session_id: &str) {
        self.channels.write().remove(session_id);
    }

    /// Number of sessions with a live channel.
    #[must_use]
    pub fn active_channels(&self) -> usize {
        self.channels.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(session_id: &str, secs: u64) -> SessionEvent {
        SessionEvent::TimeTick {
            session_id: session_id.to_string(),
            session_remaining_secs: secs,
            prompt_remaining_secs: 60,
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe("s1");
        let mut rx2 = bus.subscribe("s1");

        bus.broadcast(tick("s1", 299));

        assert_eq!(rx1.recv().await.unwrap().session_id(), "s1");
        assert_eq!(rx2.recv().await.unwrap().session_id(), "s1");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe("s1");
        let mut rx2 = bus.subscribe("s2");

        bus.broadcast(tick("s1", 10));
        bus.broadcast(tick("s2", 20));

        assert_eq!(rx1.recv().await.unwrap().session_id(), "s1");
        assert_eq!(rx2.recv().await.unwrap().session_id(), "s2");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        bus.broadcast(tick("s1", 5));
        // Channel exists for future subscribers, but the event is gone.
        assert_eq!(bus.active_channels(), 1);
        let mut rx = bus.subscribe("s1");
        bus.broadcast(tick("s1", 4));
        if let SessionEvent::TimeTick { session_remaining_secs, .. } = rx.recv().await.unwrap() {
            assert_eq!(session_remaining_secs, 4);
        } else {
            panic!("expected TimeTick");
        }
    }

    #[tokio::test]
    async fn test_cleanup_closes_channel() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe("s1");
        bus.cleanup("s1");
        assert_eq!(bus.active_channels(), 0);
        assert!(rx.recv().await.is_err());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = tick("s1", 42);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "time_tick");
        assert_eq!(json["session_remaining_secs"], 42);
    }
}
