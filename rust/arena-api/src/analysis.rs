//! Keyword-driven argument analysis.
//!
//! The analyzer is pure and infallible: scoring is additive over
//! declarative rule tables (keyword set → delta, keyword set → label)
//! evaluated against the lowercased argument text. Scores are clamped
//! to `[1, 10]` after all deltas apply.

use serde::{Deserialize, Serialize};

use crate::session::state::Message;

/// Primary classification of an argument.
///
/// Detection order is a fixed priority: empirical beats ethical beats
/// opinion-based; `Logical` is the default when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentType {
    Empirical,
    Ethical,
    OpinionBased,
    Logical,
}

impl std::fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empirical => write!(f, "empirical"),
            Self::Ethical => write!(f, "ethical"),
            Self::OpinionBased => write!(f, "opinion-based"),
            Self::Logical => write!(f, "logical"),
        }
    }
}

/// Structured analysis of a single user argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentAnalysis {
    pub argument_type: ArgumentType,
    /// Overall strength, `[1, 10]`.
    pub strength: u8,
    pub weaknesses: Vec<String>,
    pub fallacies: Vec<String>,
    pub emotional_appeals: Vec<String>,
    /// Evidence quality, `[1, 10]`.
    pub evidence_quality: u8,
    /// Logical structure, `[1, 10]`.
    pub logical_structure: u8,
    /// Fixed, ordered counterargument angles for downstream components.
    pub counterargument_hints: Vec<String>,
}

/// Additive strength deltas: any keyword in the set fires the delta once.
const STRENGTH_RULES: &[(&[&str], i32)] = &[
    (&["study", "research"], 1),
    (&["expert", "professor"], 1),
    (&["data", "statistics"], 1),
    (&["because", "therefore"], 1),
    (&["however", "although"], 1),
    (&["i think", "i feel"], -1),
    (&["obviously", "clearly"], -1),
];

/// Evidence-quality deltas over a base of 3.
const EVIDENCE_RULES: &[(&[&str], i32)] = &[
    (&["study", "research"], 3),
    (&["peer-reviewed", "published"], 2),
    (&["data", "statistics"], 2),
    (&["source", "citation"], 1),
];

/// Weakness labels; every matching rule fires.
const WEAKNESS_RULES: &[(&[&str], &str)] = &[
    (&["i think", "i believe"], "Over-reliance on personal opinion"),
    (&["everyone knows", "obviously"], "Unsupported assumptions"),
    (&["always", "never"], "Overgeneralization"),
];

/// Emotional appeal labels; every matching rule fires.
const APPEAL_RULES: &[(&[&str], &str)] = &[
    (&["fear", "danger", "threat"], "Appeal to fear"),
    (&["tradition", "always done"], "Appeal to tradition"),
    (&["expert", "authority"], "Appeal to authority"),
];

/// Fixed counterargument angles, in order.
pub const COUNTERARGUMENT_HINTS: [&str; 4] = [
    "Alternative perspective consideration",
    "Evidence quality challenge",
    "Scope limitation argument",
    "Practical implementation concerns",
];

/// Pure keyword-heuristic argument analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentAnalyzer;

impl ArgumentAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyze a user argument.
    ///
    /// Topic and history are part of the call contract for future
    /// context-aware heuristics; the current rules are purely lexical.
    #[must_use]
    pub fn analyze(
        &self,
        text: &str,
        _topic: &str,
        _recent_history: &[Message],
    ) -> ArgumentAnalysis {
        let lower = text.to_lowercase();

        ArgumentAnalysis {
            argument_type: classify(&lower),
            strength: score_rules(&lower, STRENGTH_RULES, 5),
            weaknesses: label_rules(&lower, WEAKNESS_RULES),
            fallacies: detect_fallacies(&lower),
            emotional_appeals: label_rules(&lower, APPEAL_RULES),
            evidence_quality: score_rules(&lower, EVIDENCE_RULES, 3),
            logical_structure: score_logical_structure(&lower),
            counterargument_hints: COUNTERARGUMENT_HINTS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// True if any needle occurs as a substring.
fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Classify by keyword priority.
fn classify(lower: &str) -> ArgumentType {
    if contains_any(lower, &["study", "research", "data"]) {
        ArgumentType::Empirical
    } else if contains_any(lower, &["should", "ought", "moral"]) {
        ArgumentType::Ethical
    } else if contains_any(lower, &["feel", "believe", "think"]) {
        ArgumentType::OpinionBased
    } else {
        ArgumentType::Logical
    }
}

/// Apply a delta rule table over a base score and clamp to `[1, 10]`.
fn score_rules(lower: &str, rules: &[(&[&str], i32)], base: i32) -> u8 {
    let mut score = base;
    for (needles, delta) in rules {
        if contains_any(lower, needles) {
            score += delta;
        }
    }
    clamp_score(score)
}

/// Collect every matching label, in table order.
fn label_rules(lower: &str, rules: &[(&[&str], &str)]) -> Vec<String> {
    rules
        .iter()
        .filter(|(needles, _)| contains_any(lower, needles))
        .map(|(_, label)| (*label).to_string())
        .collect()
}

/// Fallacy detection. These need conjunctions, so they do not fit the
/// flat rule tables.
fn detect_fallacies(lower: &str) -> Vec<String> {
    let mut fallacies = Vec::new();
    if lower.contains("everyone") && lower.contains("thinks") {
        fallacies.push("Bandwagon fallacy".to_string());
    }
    if lower.contains("slippery slope") || (lower.contains("if") && lower.contains("then")) {
        fallacies.push("Slippery slope".to_string());
    }
    if lower.contains("strawman") || lower.contains("you said") {
        fallacies.push("Straw man".to_string());
    }
    fallacies
}

/// Structure score: connectives add, missing causal links and
/// single-sentence arguments subtract.
fn score_logical_structure(lower: &str) -> u8 {
    let mut score = 5;
    if contains_any(lower, &["because", "since"]) {
        score += 1;
    }
    if contains_any(lower, &["therefore", "thus"]) {
        score += 1;
    }
    if contains_any(lower, &["however", "although"]) {
        score += 1;
    }
    if contains_any(lower, &["first", "second"]) {
        score += 1;
    }
    let sentences = lower.split('.').filter(|s| !s.trim().is_empty()).count();
    if sentences < 2 {
        score -= 1;
    }
    if !contains_any(lower, &["because", "since"]) {
        score -= 1;
    }
    clamp_score(score)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(score: i32) -> u8 {
    score.clamp(1, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> ArgumentAnalysis {
        ArgumentAnalyzer::new().analyze(text, "Ethics", &[])
    }

    #[test]
    fn test_type_priority_empirical_wins() {
        // "research" outranks "should" and "think".
        let a = analyze("Research shows we should think harder about this.");
        assert_eq!(a.argument_type, ArgumentType::Empirical);
    }

    #[test]
    fn test_type_ethical_then_opinion_then_logical() {
        assert_eq!(analyze("We ought to ban it.").argument_type, ArgumentType::Ethical);
        assert_eq!(analyze("I believe it works.").argument_type, ArgumentType::OpinionBased);
        assert_eq!(analyze("It rains. The ground gets wet.").argument_type, ArgumentType::Logical);
    }

    #[test]
    fn test_weak_opinionated_argument() {
        let a = analyze("I think everyone knows this is obviously true. It always works.");
        assert_eq!(a.argument_type, ArgumentType::OpinionBased);
        // base 5, -1 ("i think"), -1 ("obviously").
        assert_eq!(a.strength, 3);
        assert_eq!(
            a.weaknesses,
            vec![
                "Over-reliance on personal opinion",
                "Unsupported assumptions",
                "Overgeneralization",
            ]
        );
        assert_eq!(a.evidence_quality, 3);
        // base 5, two sentences, no because/since.
        assert_eq!(a.logical_structure, 4);
    }

    #[test]
    fn test_strong_argument_scores_high() {
        let a = analyze(
            "A peer-reviewed study with solid data supports this, because the statistics \
             are clear. However, the expert consensus matters too. Therefore we act.",
        );
        // strength: 5 +1 study +1 expert +1 data +1 because/therefore +1 however = 10.
        assert_eq!(a.strength, 10);
        // evidence: 3 +3 study +2 peer-reviewed +2 data = 10 (clamped).
        assert_eq!(a.evidence_quality, 10);
        assert_eq!(a.argument_type, ArgumentType::Empirical);
    }

    #[test]
    fn test_scores_clamped_to_floor() {
        let a = analyze("I think I feel this is obviously clearly right");
        // base 5, -1 opinion markers, -1 certainty markers = 3; floor not hit
        // here, but never below 1 by construction.
        assert!(a.strength >= 1);
        assert!(a.logical_structure >= 1);
    }

    #[test]
    fn test_bandwagon_needs_both_words() {
        let a = analyze("Everyone thinks this is fine.");
        assert!(a.fallacies.contains(&"Bandwagon fallacy".to_string()));
        let b = analyze("Everyone agrees with me.");
        assert!(!b.fallacies.contains(&"Bandwagon fallacy".to_string()));
    }

    #[test]
    fn test_slippery_slope_if_then() {
        let a = analyze("If we allow this, then everything collapses.");
        assert!(a.fallacies.contains(&"Slippery slope".to_string()));
        let b = analyze("This is a slippery slope.");
        assert!(b.fallacies.contains(&"Slippery slope".to_string()));
    }

    #[test]
    fn test_emotional_appeals() {
        let a = analyze("There is a real danger here, and the experts agree tradition matters.");
        assert_eq!(
            a.emotional_appeals,
            vec!["Appeal to fear", "Appeal to tradition", "Appeal to authority"]
        );
    }

    #[test]
    fn test_counterargument_hints_fixed() {
        let a = analyze("anything");
        assert_eq!(a.counterargument_hints.len(), 4);
        assert_eq!(a.counterargument_hints[0], "Alternative perspective consideration");
        assert_eq!(a.counterargument_hints[3], "Practical implementation concerns");
    }
}
