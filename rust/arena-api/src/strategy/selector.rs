//! Per-round strategy selection.
//!
//! Each strategy starts from a baseline of 5 and accumulates
//! independent contributions from the argument analysis, the room
//! category and recent agent messages. The winner is the first
//! strictly-highest score in catalog order; when nothing scores above
//! the pre-seeded default, `logical-deconstruction` is used.
//! Deterministic and infallible.

use crate::analysis::{ArgumentAnalysis, ArgumentType};
use crate::session::state::{Message, Sender};
use crate::strategy::catalog::{Strategy, StrategyCatalog, DEFAULT_STRATEGY_INDEX, STRATEGIES};

/// Ephemeral per-round score for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyScore {
    pub name: &'static str,
    pub score: i32,
}

/// Deterministic strategy selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategySelector;

impl StrategySelector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score every strategy for this round, in catalog order.
    #[must_use]
    pub fn scores(
        &self,
        catalog: &StrategyCatalog,
        analysis: &ArgumentAnalysis,
        room: &str,
        recent_history: &[Message],
    ) -> Vec<StrategyScore> {
        catalog
            .all()
            .iter()
            .map(|strategy| StrategyScore {
                name: strategy.name,
                score: score_strategy(strategy, analysis, room, recent_history),
            })
            .collect()
    }

    /// Pick the strategy for this round.
    ///
    /// `recent_history` is the trailing transcript window (at most the
    /// last four messages); only agent entries feed the anti-repetition
    /// penalty.
    #[must_use]
    pub fn select(
        &self,
        catalog: &StrategyCatalog,
        analysis: &ArgumentAnalysis,
        room: &str,
        recent_history: &[Message],
    ) -> &'static Strategy {
        let mut best: &'static Strategy = &STRATEGIES[DEFAULT_STRATEGY_INDEX];
        let mut best_score = 0;
        for strategy in catalog.all() {
            let score = score_strategy(strategy, analysis, room, recent_history);
            if score > best_score {
                best_score = score;
                best = strategy;
            }
        }
        best
    }
}

fn score_strategy(
    strategy: &Strategy,
    analysis: &ArgumentAnalysis,
    room: &str,
    recent_history: &[Message],
) -> i32 {
    let mut score = 5;
    score += argument_type_bonus(analysis.argument_type, strategy.name);
    score += weakness_bonus(&analysis.weaknesses, strategy.name);
    score += fallacy_bonus(&analysis.fallacies, strategy.name);
    score += strength_bonus(analysis.strength, strategy.name);
    score += room_bonus(room, strategy.name);
    score += repetition_penalty(recent_history, strategy.name);
    score
}

/// +2 when the strategy is canonical for the argument type.
fn argument_type_bonus(argument_type: ArgumentType, name: &str) -> i32 {
    let preferred: &[&str] = match argument_type {
        ArgumentType::Empirical => &["evidence-challenge", "scope-limitation"],
        ArgumentType::Ethical => &["reframe-perspective", "counter-example"],
        ArgumentType::OpinionBased => &["socratic-questioning", "logical-deconstruction"],
        ArgumentType::Logical => &["logical-deconstruction", "counter-example"],
    };
    i32::from(preferred.contains(&name)) * 2
}

/// +1 per detected weakness paired with the strategy built to exploit it.
fn weakness_bonus(weaknesses: &[String], name: &str) -> i32 {
    let mut score = 0;
    for weakness in weaknesses {
        if weakness.contains("opinion") && name == "socratic-questioning" {
            score += 1;
        }
        if weakness.contains("assumption") && name == "evidence-challenge" {
            score += 1;
        }
        if weakness.contains("generalization") && name == "counter-example" {
            score += 1;
        }
    }
    score
}

/// +2 per detected fallacy paired with its countering strategy.
fn fallacy_bonus(fallacies: &[String], name: &str) -> i32 {
    let mut score = 0;
    for fallacy in fallacies {
        let lower = fallacy.to_lowercase();
        if lower.contains("bandwagon") && name == "logical-deconstruction" {
            score += 2;
        }
        if lower.contains("slippery slope") && name == "scope-limitation" {
            score += 2;
        }
        if lower.contains("straw man") && name == "reframe-perspective" {
            score += 2;
        }
    }
    score
}

/// Strong arguments get the sophisticated strategies, weak ones the
/// direct ones.
fn strength_bonus(strength: u8, name: &str) -> i32 {
    if strength >= 8 {
        return i32::from(name == "evidence-challenge" || name == "scope-limitation") * 2;
    }
    if strength <= 4 {
        return i32::from(name == "socratic-questioning" || name == "logical-deconstruction") * 2;
    }
    0
}

/// +1 when the room category favors the strategy. Unknown rooms add
/// nothing; room strings are never validated.
fn room_bonus(room: &str, name: &str) -> i32 {
    let preferred: &[&str] = match room {
        "Law" => &["evidence-challenge", "logical-deconstruction"],
        "Politics" => &["reframe-perspective", "practical-concerns"],
        "Ethics" => &["socratic-questioning", "counter-example"],
        "Cultural" => &["reframe-perspective", "alternative-solution"],
        "Technology" => &["practical-concerns", "scope-limitation"],
        _ => &[],
    };
    i32::from(preferred.contains(&name))
}

/// −1 when a recent agent message already names this strategy
/// (hyphens read as spaces in generated prose).
fn repetition_penalty(recent_history: &[Message], name: &str) -> i32 {
    let spoken = name.replace('-', " ");
    let used = recent_history
        .iter()
        .filter(|m| m.sender == Sender::Agent)
        .any(|m| m.text.to_lowercase().contains(&spoken));
    -i32::from(used)
}
