//! End-of-session report generation.

use crate::session::state::DebateSession;

/// Build the final report: winner line, final scores, round count.
/// Always non-empty.
pub(crate) fn final_report(session: &DebateSession) -> String {
    let user = session.score.user;
    let agent = session.score.agent;
    let outcome = if user > agent {
        "You win! Well argued."
    } else if agent > user {
        "The bot wins! Better luck next time."
    } else {
        "It's a tie! You're equally stubborn."
    };

    format!(
        "Final results\n\n{outcome}\n\nFinal scores:\n- You: {user} points\n- Bot: {agent} \
         points\n\nRounds debated: {rounds}\n",
        rounds = session.rounds.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{Message, Sender};
    use crate::judge::Verdict;

    fn session_with_score(user: u32, agent: u32) -> DebateSession {
        let mut session = DebateSession::new("s1", "topic", "Ethics", 300, 60);
        for i in 0..(user + agent) {
            session.begin_round(Message::user(format!("arg {i}"))).unwrap();
            let winner = if i < user { Sender::User } else { Sender::Agent };
            session
                .mark_round_judged(Some(Verdict {
                    winner,
                    ruling: "ruled".to_string(),
                }))
                .unwrap();
        }
        session
    }

    #[test]
    fn test_user_win_line() {
        let report = final_report(&session_with_score(3, 1));
        assert!(report.contains("You win!"));
        assert!(report.contains("- You: 3 points"));
        assert!(report.contains("- Bot: 1 points"));
        assert!(report.contains("Rounds debated: 4"));
    }

    #[test]
    fn test_agent_win_line() {
        let report = final_report(&session_with_score(0, 2));
        assert!(report.contains("The bot wins!"));
    }

    #[test]
    fn test_tie_line_and_non_empty_for_fresh_session() {
        let session = DebateSession::new("s1", "topic", "Ethics", 300, 60);
        let report = final_report(&session);
        assert!(report.contains("It's a tie!"));
        assert!(report.contains("Rounds debated: 0"));
        assert!(!report.is_empty());
    }
}
