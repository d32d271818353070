//! Session state: messages, rounds, phases and the session aggregate.
//!
//! `DebateSession` is owned by the engine and mutated only through its
//! transition methods, which uphold the core invariants: at most one
//! unjudged round at a time, strict turn alternation, and a score sum
//! that never exceeds the number of judged rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::judge::Verdict;

/// Who authored a message (and whose turn it is).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The session clock ran out.
    Timeout,
    /// The user (or API client) ended the debate.
    Completed,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Created but not yet started (transient).
    Idle,
    /// Waiting for the user's next argument.
    AwaitingUser,
    /// The response pipeline is running.
    AgentThinking,
    /// The round judge is ruling.
    Judging,
    /// Terminal. Counters are frozen and the final report is cached.
    Ended(EndReason),
}

/// A single transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// Create an agent message stamped with the current time.
    #[must_use]
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Agent,
            timestamp: Utc::now(),
        }
    }
}

/// Running score for both participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub user: u32,
    pub agent: u32,
}

/// One user-argument / agent-rebuttal exchange.
///
/// Created when the user message is accepted; `agent_message` and
/// `verdict` are filled in as the pipeline progresses. The opening
/// topic-setting exchange is not a round and is never judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub index: u32,
    pub user_message: Message,
    pub agent_message: Option<Message>,
    /// Name of the rebuttal strategy used ("fallback" when the
    /// pipeline failed).
    pub strategy_name: String,
    /// Ruling, absent when the judge failed for this round.
    pub verdict: Option<Verdict>,
    /// Set exactly once, when the round has been adjudicated.
    pub judged: bool,
}

/// The session aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    pub id: String,
    /// Derived debate topic ("Why ... is actually harmful to society").
    pub topic: String,
    /// Opaque room/category string. Never semantically validated.
    pub room: String,
    /// Append-only transcript, including the opening exchange.
    pub transcript: Vec<Message>,
    pub score: Score,
    pub session_remaining_secs: u64,
    pub prompt_remaining_secs: u64,
    /// Whose move it is.
    pub turn: Sender,
    pub phase: SessionPhase,
    pub rounds: Vec<Round>,
    /// Draft input buffered for the prompt-timeout auto-submit.
    pub pending_input: String,
    /// Cached end-of-session report, set on first end.
    pub final_report: Option<String>,
}

impl DebateSession {
    /// Create a fresh session with full countdowns.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        room: impl Into<String>,
        session_secs: u64,
        prompt_secs: u64,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            room: room.into(),
            transcript: Vec::new(),
            score: Score::default(),
            session_remaining_secs: session_secs,
            prompt_remaining_secs: prompt_secs,
            turn: Sender::User,
            phase: SessionPhase::Idle,
            rounds: Vec::new(),
            pending_input: String::new(),
            final_report: None,
        }
    }

    /// Whether the session is in an active (non-terminal) phase.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingUser | SessionPhase::AgentThinking | SessionPhase::Judging
        )
    }

    /// Whether the session has reached a terminal phase.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended(_))
    }

    /// Append a message to the transcript.
    pub fn push_message(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// The trailing `n` transcript entries, oldest first.
    #[must_use]
    pub fn recent_history(&self, n: usize) -> &[Message] {
        let start = self.transcript.len().saturating_sub(n);
        &self.transcript[start..]
    }

    /// Open a new round for an accepted user message.
    ///
    /// The previous round (if any) must already be judged.
    pub fn begin_round(&mut self, user_message: Message) -> Result<&mut Round, EngineError> {
        if let Some(last) = self.rounds.last()
            && !last.judged
        {
            return Err(EngineError::InvalidState(
                "previous round has not been judged".to_string(),
            ));
        }
        let index = u32::try_from(self.rounds.len())
            .map_err(|e| EngineError::Internal(format!("round counter overflow: {e}")))?
            + 1;
        self.rounds.push(Round {
            index,
            user_message,
            agent_message: None,
            strategy_name: String::new(),
            verdict: None,
            judged: false,
        });
        self.rounds
            .last_mut()
            .ok_or_else(|| EngineError::Internal("round vanished after push".to_string()))
    }

    /// The round currently in flight, if any.
    pub fn current_round_mut(&mut self) -> Option<&mut Round> {
        self.rounds.last_mut().filter(|r| !r.judged)
    }

    /// Mark the in-flight round judged and apply the verdict's point.
    ///
    /// `verdict` is `None` when the judge failed; the round still
    /// completes but nobody scores. Judging an already-judged round is
    /// an invariant violation.
    pub fn mark_round_judged(&mut self, verdict: Option<Verdict>) -> Result<(), EngineError> {
        let round = self
            .rounds
            .last_mut()
            .ok_or_else(|| EngineError::InvalidState("no round to judge".to_string()))?;
        if round.judged {
            return Err(EngineError::InvalidState(
                "round has already been judged".to_string(),
            ));
        }
        if let Some(verdict) = &verdict {
            match verdict.winner {
                Sender::User => self.score.user += 1,
                Sender::Agent => self.score.agent += 1,
            }
        }
        round.verdict = verdict;
        round.judged = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DebateSession {
        DebateSession::new("s1", "Why cats are actually harmful to society", "Ethics", 300, 60)
    }

    #[test]
    fn test_new_session_defaults() {
        let s = session();
        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(s.turn, Sender::User);
        assert_eq!(s.session_remaining_secs, 300);
        assert_eq!(s.prompt_remaining_secs, 60);
        assert!(s.rounds.is_empty());
        assert!(s.final_report.is_none());
        assert!(!s.is_active());
        assert!(!s.is_ended());
    }

    #[test]
    fn test_recent_history_tail() {
        let mut s = session();
        for i in 0..6 {
            s.push_message(Message::user(format!("m{i}")));
        }
        let tail = s.recent_history(4);
        assert_eq!(tail.len(), 4);
        assert_eq!(tail[0].text, "m2");
        assert_eq!(tail[3].text, "m5");
        // Asking for more than exists returns everything.
        assert_eq!(s.recent_history(100).len(), 6);
    }

    #[test]
    fn test_single_unjudged_round_invariant() {
        let mut s = session();
        s.begin_round(Message::user("first")).unwrap();
        let err = s.begin_round(Message::user("second")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));

        s.mark_round_judged(None).unwrap();
        s.begin_round(Message::user("second")).unwrap();
        assert_eq!(s.rounds.len(), 2);
        assert_eq!(s.rounds[1].index, 2);
    }

    #[test]
    fn test_judge_once_guard() {
        let mut s = session();
        s.begin_round(Message::user("arg")).unwrap();
        s.mark_round_judged(Some(Verdict {
            winner: Sender::User,
            ruling: "user wins".to_string(),
        }))
        .unwrap();
        assert_eq!(s.score.user, 1);
        assert_eq!(s.score.agent, 0);

        let err = s.mark_round_judged(None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        // Score unchanged by the rejected second judgement.
        assert_eq!(s.score.user, 1);
    }

    #[test]
    fn test_judge_failure_awards_no_point() {
        let mut s = session();
        s.begin_round(Message::user("arg")).unwrap();
        s.mark_round_judged(None).unwrap();
        assert_eq!(s.score.user + s.score.agent, 0);
        assert!(s.rounds[0].judged);
        assert!(s.rounds[0].verdict.is_none());
    }

    #[test]
    fn test_phase_predicates() {
        let mut s = session();
        s.phase = SessionPhase::AwaitingUser;
        assert!(s.is_active());
        s.phase = SessionPhase::Ended(EndReason::Timeout);
        assert!(s.is_ended());
        assert!(!s.is_active());
    }
}
