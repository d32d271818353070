//! The debate engine: session registry, state transitions and the
//! analyze → select → synthesize → judge pipeline.
//!
//! # Concurrency
//!
//! Each session carries one `tokio::sync::Mutex<DebateSession>` that is
//! the exclusive critical section: submits, prompt-timeout auto-submits,
//! ends and timer ticks all serialize on it, so a timer callback can
//! never interleave with an in-flight transition. The registry itself is
//! a `parking_lot::RwLock` map; sessions are independent.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::analysis::ArgumentAnalyzer;
use crate::config::DebateConfig;
use crate::error::EngineError;
use crate::events::{EventBus, SessionEvent};
use crate::judge::{Adjudicator, CoinFlipJudge};
use crate::session::report;
use crate::session::state::{DebateSession, EndReason, Message, Sender, SessionPhase};
use crate::session::timer;
use crate::strategy::{StrategyCatalog, StrategySelector};
use crate::synthesis::{fallback_response, ResponseGenerator, TemplateGenerator, FALLBACK_STRATEGY};

/// Rotating status lines surfaced while the pipeline runs, indexed by
/// round number.
pub const THINKING_STATUSES: [&str; 12] = [
    "researching how many green bubblers are single",
    "studying android user poverty levels",
    "calculating the economic impact of having an opinion",
    "consulting the ancient scrolls of Wikipedia",
    "asking my mom for advice",
    "generating statistics that sound believable",
    "cross-referencing with my gut feeling",
    "polling my imaginary focus group",
    "checking if this violates any terms of service",
    "wondering why humans argue about everything",
    "contemplating the meaning of being right on the internet",
    "analyzing the philosophical implications of your stance",
];

/// Sentinel ruling used when the judge fails for a round.
pub const JUDGE_UNAVAILABLE_RULING: &str =
    "The judge is experiencing technical difficulties this round.";

/// Placeholder submitted when the prompt countdown expires with no
/// buffered input.
pub const NO_RESPONSE_PLACEHOLDER: &str = "(no response)";

/// Transcript window fed to the strategy selector.
const SELECTOR_HISTORY: usize = 4;

/// Transcript window fed to the analyzer and response generator.
const GENERATOR_HISTORY: usize = 3;

/// Result of starting a session.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub session_id: String,
    /// The scripted topic-setting agent reply.
    pub message: String,
}

/// Result of one completed round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub bot_response: String,
    pub user_points: u32,
    pub agent_points: u32,
    /// Session seconds remaining when the round completed.
    pub time_remaining: u64,
    /// The ruling, or the judge-unavailable sentinel.
    pub judge_explanation: String,
    /// Rotating thinking-status line for this round.
    pub status_update: String,
    pub session_active: bool,
}

/// Per-session handle: the exclusive state lock plus the timer task.
#[derive(Debug, Clone)]
pub(crate) struct SessionHandle {
    pub(crate) state: Arc<Mutex<DebateSession>>,
    pub(crate) timer: Arc<parking_lot::Mutex<Option<JoinHandle<()>>>>,
}

struct EngineInner {
    catalog: StrategyCatalog,
    analyzer: ArgumentAnalyzer,
    selector: StrategySelector,
    generator: Arc<dyn ResponseGenerator>,
    judge: Arc<dyn Adjudicator>,
    events: EventBus,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    timing: DebateConfig,
}

/// Cloneable handle to the engine. All clones share state.
#[derive(Clone)]
pub struct DebateEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for DebateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateEngine")
            .field("sessions", &self.inner.sessions.read().len())
            .finish_non_exhaustive()
    }
}

impl DebateEngine {
    /// Engine with the deterministic template generator and a coin-flip
    /// judge (seeded when `timing.judge_seed` is set).
    #[must_use]
    pub fn new(timing: DebateConfig) -> Self {
        let judge: Arc<dyn Adjudicator> = match timing.judge_seed {
            Some(seed) => Arc::new(CoinFlipJudge::with_seed(seed)),
            None => Arc::new(CoinFlipJudge::new()),
        };
        Self::with_components(timing, Arc::new(TemplateGenerator::new()), judge)
    }

    /// Engine with custom generation and adjudication components.
    #[must_use]
    pub fn with_components(
        timing: DebateConfig,
        generator: Arc<dyn ResponseGenerator>,
        judge: Arc<dyn Adjudicator>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                catalog: StrategyCatalog::new(),
                analyzer: ArgumentAnalyzer::new(),
                selector: StrategySelector::new(),
                generator,
                judge,
                events: EventBus::new(),
                sessions: RwLock::new(HashMap::new()),
                timing,
            }),
        }
    }

    pub(crate) fn timing(&self) -> &DebateConfig {
        &self.inner.timing
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Start a new session from the user's opening message.
    ///
    /// Derives the debate topic, records the opening exchange (which is
    /// not a judged round), starts the countdown task and returns the
    /// scripted topic-setting reply.
    pub fn start(&self, initial_message: &str, room: &str) -> Result<StartOutcome, EngineError> {
        let text = initial_message.trim();
        if text.is_empty() {
            return Err(EngineError::Validation(
                "initial_message must not be empty".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let topic = format!("Why {} is actually harmful to society", text.to_lowercase());
        let reply = format!(
            "Perfect! I've found the ideal debate topic: \"{topic}\". Let's begin - I'll \
             argue against your position!"
        );

        let mut session = DebateSession::new(
            &id,
            &topic,
            room,
            self.inner.timing.session_secs,
            self.inner.timing.prompt_secs,
        );
        session.push_message(Message::user(text));
        session.push_message(Message::agent(reply.clone()));
        session.phase = SessionPhase::AwaitingUser;

        let handle = SessionHandle {
            state: Arc::new(Mutex::new(session)),
            timer: Arc::new(parking_lot::Mutex::new(None)),
        };
        self.inner.sessions.write().insert(id.clone(), handle.clone());

        self.inner.events.broadcast(SessionEvent::SessionStarted {
            session_id: id.clone(),
            topic,
            room: room.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(session_id = %id, room = %room, "debate session started");

        let task = timer::spawn(self.clone(), id.clone(), handle.clone());
        *handle.timer.lock() = Some(task);

        Ok(StartOutcome {
            session_id: id,
            message: reply,
        })
    }

    /// Submit a user argument and run one full round.
    pub async fn submit(&self, session_id: &str, text: &str) -> Result<RoundOutcome, EngineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation("message must not be empty".to_string()));
        }
        let handle = self.handle(session_id)?;
        let mut session = handle.state.lock().await;
        self.run_round(&mut session, trimmed).await
    }

    /// End a session. Idempotent: an already-ended session returns the
    /// cached report without re-deriving anything. An in-flight round
    /// completes first because this waits on the same session lock.
    pub async fn end(&self, session_id: &str) -> Result<String, EngineError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.state.lock().await;
        if let Some(existing) = session.final_report.clone() {
            return Ok(existing);
        }
        Ok(self.end_locked(&mut session, &handle, EndReason::Completed))
    }

    /// Subscribe to a session's event stream.
    pub fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SessionEvent>, EngineError> {
        let _ = self.handle(session_id)?;
        Ok(self.inner.events.subscribe(session_id))
    }

    /// Buffer draft input for the prompt-timeout auto-submit.
    pub async fn set_pending_input(&self, session_id: &str, text: &str) -> Result<(), EngineError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.state.lock().await;
        if session.is_ended() {
            return Err(EngineError::InvalidState("session has ended".to_string()));
        }
        session.pending_input = text.to_string();
        Ok(())
    }

    /// Clone of the current session state, for inspection.
    pub async fn snapshot(&self, session_id: &str) -> Result<DebateSession, EngineError> {
        let handle = self.handle(session_id)?;
        let session = handle.state.lock().await;
        Ok(session.clone())
    }

    fn handle(&self, session_id: &str) -> Result<SessionHandle, EngineError> {
        self.inner
            .sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))
    }

    /// Run one round with the session lock already held. Shared by
    /// `submit` and the prompt-timeout auto-submit.
    pub(crate) async fn run_round(
        &self,
        session: &mut DebateSession,
        text: &str,
    ) -> Result<RoundOutcome, EngineError> {
        if session.is_ended() {
            return Err(EngineError::InvalidState("session has ended".to_string()));
        }
        if session.phase != SessionPhase::AwaitingUser || session.turn != Sender::User {
            return Err(EngineError::InvalidState(
                "not awaiting a user argument".to_string(),
            ));
        }

        // History snapshots exclude the argument being submitted.
        let selector_history = session.recent_history(SELECTOR_HISTORY).to_vec();
        let generator_history = session.recent_history(GENERATOR_HISTORY).to_vec();

        let user_message = Message::user(text);
        session.push_message(user_message.clone());
        let round_index = session.begin_round(user_message.clone())?.index;
        session.turn = Sender::Agent;
        session.phase = SessionPhase::AgentThinking;

        let status = THINKING_STATUSES[(round_index as usize - 1) % THINKING_STATUSES.len()];
        self.inner.events.broadcast(SessionEvent::UserSubmitted {
            session_id: session.id.clone(),
            round: round_index,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        self.inner.events.broadcast(SessionEvent::AgentThinking {
            session_id: session.id.clone(),
            round: round_index,
            status: status.to_string(),
        });

        // Templates key their topic tables on the room category; free-text
        // rooms fall through to the generic entries.
        let topic_ctx = if session.room.is_empty() {
            session.topic.clone()
        } else {
            session.room.clone()
        };

        let analysis = self.inner.analyzer.analyze(text, &topic_ctx, &generator_history);
        let strategy = self.inner.selector.select(
            &self.inner.catalog,
            &analysis,
            &session.room,
            &selector_history,
        );
        tracing::debug!(
            session_id = %session.id,
            round = round_index,
            strategy = strategy.name,
            argument_type = %analysis.argument_type,
            strength = analysis.strength,
            "argument analyzed"
        );

        let (response, strategy_name) = match self
            .inner
            .generator
            .generate(text, &analysis, strategy, &topic_ctx, &generator_history)
            .await
        {
            Ok(response) => (response, strategy.name.to_string()),
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id,
                    round = round_index,
                    error = %err,
                    "response pipeline failed, using fallback"
                );
                (fallback_response(), FALLBACK_STRATEGY.to_string())
            }
        };

        let agent_message = Message::agent(response.text.clone());
        session.push_message(agent_message.clone());
        if let Some(round) = session.current_round_mut() {
            round.agent_message = Some(agent_message.clone());
            round.strategy_name = strategy_name.clone();
        }
        self.inner.events.broadcast(SessionEvent::AgentReplied {
            session_id: session.id.clone(),
            round: round_index,
            text: response.text.clone(),
            strategy: strategy_name,
            confidence: response.confidence,
            timestamp: Utc::now(),
        });

        session.phase = SessionPhase::Judging;
        let verdict = match self.inner.judge.judge(&user_message, &agent_message) {
            Ok(verdict) => Some(verdict),
            Err(err) => {
                tracing::warn!(
                    session_id = %session.id,
                    round = round_index,
                    error = %err,
                    "judge failed, round completes without a point"
                );
                None
            }
        };
        let judge_explanation = verdict
            .as_ref()
            .map_or_else(|| JUDGE_UNAVAILABLE_RULING.to_string(), |v| v.ruling.clone());
        let winner = verdict.as_ref().map(|v| v.winner);
        session.mark_round_judged(verdict)?;
        self.inner.events.broadcast(SessionEvent::RoundJudged {
            session_id: session.id.clone(),
            round: round_index,
            winner,
            ruling: judge_explanation.clone(),
            user_points: session.score.user,
            agent_points: session.score.agent,
        });

        session.prompt_remaining_secs = self.inner.timing.prompt_secs;
        session.turn = Sender::User;
        session.phase = SessionPhase::AwaitingUser;
        session.pending_input.clear();
        self.inner.events.broadcast(SessionEvent::PromptReset {
            session_id: session.id.clone(),
            prompt_remaining_secs: session.prompt_remaining_secs,
        });

        Ok(RoundOutcome {
            bot_response: response.text,
            user_points: session.score.user,
            agent_points: session.score.agent,
            time_remaining: session.session_remaining_secs,
            judge_explanation,
            status_update: status.to_string(),
            session_active: true,
        })
    }

    /// Terminal transition with the session lock held. Freezes counters,
    /// caches the report, stops the timer and tears down the event
    /// channel.
    pub(crate) fn end_locked(
        &self,
        session: &mut DebateSession,
        handle: &SessionHandle,
        reason: EndReason,
    ) -> String {
        session.phase = SessionPhase::Ended(reason);
        let final_report = report::final_report(session);
        session.final_report = Some(final_report.clone());

        if let Some(task) = handle.timer.lock().take() {
            task.abort();
        }

        self.inner.events.broadcast(SessionEvent::SessionEnded {
            session_id: session.id.clone(),
            reason,
            final_report: final_report.clone(),
            timestamp: Utc::now(),
        });
        self.inner.events.cleanup(&session.id);
        tracing::info!(session_id = %session.id, reason = %reason, "debate session ended");

        final_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_derives_topic_and_reply() {
        let engine = DebateEngine::new(DebateConfig::default());
        let outcome = engine.start("Cats Are Great", "Ethics").unwrap();
        let session = engine.snapshot(&outcome.session_id).await.unwrap();

        assert_eq!(session.topic, "Why cats are great is actually harmful to society");
        assert!(outcome.message.contains("I've found the ideal debate topic"));
        assert!(outcome.message.contains(&session.topic));
        assert_eq!(session.phase, SessionPhase::AwaitingUser);
        assert_eq!(session.turn, Sender::User);
        // The opening exchange is transcript only, never a round.
        assert_eq!(session.transcript.len(), 2);
        assert!(session.rounds.is_empty());
    }

    #[tokio::test]
    async fn test_start_rejects_empty_message() {
        let engine = DebateEngine::new(DebateConfig::default());
        let err = engine.start("   ", "Ethics").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let engine = DebateEngine::new(DebateConfig::default());
        let err = engine.submit("nope", "hello").await.unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
        let err = engine.end("nope").await.unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
        assert!(engine.subscribe("nope").is_err());
    }

    #[tokio::test]
    async fn test_status_update_rotates_by_round() {
        let config = DebateConfig {
            judge_seed: Some(42),
            ..DebateConfig::default()
        };
        let engine = DebateEngine::new(config);
        let id = engine.start("cats", "Ethics").unwrap().session_id;

        let first = engine.submit(&id, "I think cats are fine.").await.unwrap();
        let second = engine.submit(&id, "They purr. That is nice.").await.unwrap();
        assert_eq!(first.status_update, THINKING_STATUSES[0]);
        assert_eq!(second.status_update, THINKING_STATUSES[1]);
    }
}
