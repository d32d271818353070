//! The fixed catalog of rebuttal strategies.
//!
//! Strategies are loaded once and never mutated. Declaration order
//! matters: the selector iterates in this order and resolves scoring
//! ties in favor of the earliest strictly-highest entry.

/// A rebuttal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    /// Stable hyphenated identifier, e.g. `"socratic-questioning"`.
    pub name: &'static str,
    pub description: &'static str,
    /// Guidance template for response generation.
    pub template: &'static str,
    /// Contexts this strategy is appropriate for.
    pub tags: &'static [&'static str],
}

/// All strategies, in declaration order.
pub static STRATEGIES: [Strategy; 8] = [
    Strategy {
        name: "socratic-questioning",
        description: "Use probing questions to expose weaknesses in reasoning",
        template: "You are engaging in a debate using the socratic-questioning strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["weak-reasoning", "opinion-based", "assumption-heavy"],
    },
    Strategy {
        name: "evidence-challenge",
        description: "Question the quality and relevance of presented evidence",
        template: "You are engaging in a debate using the evidence-challenge strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["empirical", "research-based", "statistical"],
    },
    Strategy {
        name: "reframe-perspective",
        description: "Present the issue from a completely different angle",
        template: "You are engaging in a debate using the reframe-perspective strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["narrow-view", "single-perspective", "oversimplified"],
    },
    Strategy {
        name: "logical-deconstruction",
        description: "Break down the argument to find logical flaws",
        template: "You are engaging in a debate using the logical-deconstruction strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["logical", "structured", "formal-argument"],
    },
    Strategy {
        name: "counter-example",
        description: "Provide specific examples that contradict the claim",
        template: "You are engaging in a debate using the counter-example strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["generalization", "universal-claim", "absolute-statement"],
    },
    Strategy {
        name: "scope-limitation",
        description: "Challenge the scope or applicability of the argument",
        template: "You are engaging in a debate using the scope-limitation strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["broad-claim", "overgeneralized", "context-specific"],
    },
    Strategy {
        name: "practical-concerns",
        description: "Focus on real-world implementation problems",
        template: "You are engaging in a debate using the practical-concerns strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["theoretical", "idealistic", "implementation-focused"],
    },
    Strategy {
        name: "alternative-solution",
        description: "Propose a better alternative approach",
        template: "You are engaging in a debate using the alternative-solution strategy. \
                   Respond thoughtfully and strategically to counter the user's argument. \
                   Be respectful but firm in your disagreement.",
        tags: &["problem-solution", "proposal", "recommendation"],
    },
];

/// Index of the tie-break default, `logical-deconstruction`.
pub(crate) const DEFAULT_STRATEGY_INDEX: usize = 3;

/// Read-only view over the strategy set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyCatalog;

impl StrategyCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// All strategies, in declaration order.
    #[must_use]
    pub fn all(&self) -> &'static [Strategy] {
        &STRATEGIES
    }

    /// Look up a strategy by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static Strategy> {
        STRATEGIES.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_strategies_in_order() {
        let catalog = StrategyCatalog::new();
        let names: Vec<&str> = catalog.all().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "socratic-questioning",
                "evidence-challenge",
                "reframe-perspective",
                "logical-deconstruction",
                "counter-example",
                "scope-limitation",
                "practical-concerns",
                "alternative-solution",
            ]
        );
    }

    #[test]
    fn test_default_index_points_at_logical_deconstruction() {
        assert_eq!(STRATEGIES[DEFAULT_STRATEGY_INDEX].name, "logical-deconstruction");
    }

    #[test]
    fn test_get_by_name() {
        let catalog = StrategyCatalog::new();
        let s = catalog.get("counter-example").unwrap();
        assert_eq!(s.description, "Provide specific examples that contradict the claim");
        assert!(catalog.get("mind-reading").is_none());
    }

    #[test]
    fn test_every_strategy_has_tags_and_template() {
        for s in StrategyCatalog::new().all() {
            assert!(!s.tags.is_empty(), "{} has no tags", s.name);
            assert!(s.template.contains(s.name), "{} template does not name it", s.name);
        }
    }
}
