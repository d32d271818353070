//! Round adjudication.
//!
//! The judge deliberately does not grade argument quality: each round is
//! an unweighted coin flip, dressed up with a canned ruling. The flip
//! runs on a `StdRng` that can be seeded through configuration, which
//! pins outcomes for tests and reproducible deployments.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::session::state::{Message, Sender};

/// The outcome of judging one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Who takes the round's point.
    pub winner: Sender,
    /// Human-readable ruling naming the winner.
    pub ruling: String,
}

/// Round adjudication seam. Called exactly once per round.
pub trait Adjudicator: Send + Sync {
    fn judge(&self, user_message: &Message, agent_message: &Message) -> anyhow::Result<Verdict>;
}

/// Coin-flip judge over a seeded PRNG.
#[derive(Debug)]
pub struct CoinFlipJudge {
    rng: Mutex<StdRng>,
}

impl CoinFlipJudge {
    /// Judge seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Judge with a fixed seed; rulings become reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for CoinFlipJudge {
    fn default() -> Self {
        Self::new()
    }
}

impl Adjudicator for CoinFlipJudge {
    fn judge(&self, _user_message: &Message, _agent_message: &Message) -> anyhow::Result<Verdict> {
        let user_wins = self.rng.lock().random_bool(0.5);
        let winner = if user_wins { Sender::User } else { Sender::Agent };
        Ok(Verdict {
            winner,
            ruling: ruling_for(winner),
        })
    }
}

/// Canned ruling sentence for the round winner.
fn ruling_for(winner: Sender) -> String {
    match winner {
        Sender::User => {
            "You take this round - 1 point for persistence. The bot's rebuttal fell flat."
                .to_string()
        }
        Sender::Agent => {
            "The bot wins this round - 1 point for superior rebuttal technique. You get \
             credit for trying."
                .to_string()
        }
    }
}
