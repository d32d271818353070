//! Counterargument synthesis.
//!
//! The engine talks to generation through the `ResponseGenerator` trait
//! so the call is an opaque, potentially suspending operation.
//! `TemplateGenerator` is the deterministic in-process implementation:
//! strategy names map onto a closed set of generation modes, and every
//! template slot is indexed by the recent-history length rather than a
//! random draw, so identical inputs always produce identical responses.

use async_trait::async_trait;

use crate::analysis::ArgumentAnalysis;
use crate::session::state::Message;
use crate::strategy::Strategy;

/// A generated rebuttal.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedResponse {
    pub text: String,
    /// Mode-specific confidence in `[0, 1]`.
    pub confidence: f32,
    /// Citations, non-empty only for evidence challenges.
    pub sources: Vec<String>,
    /// One-line description of the approach taken.
    pub reasoning: String,
}

/// Canned response emitted when the pipeline fails mid-round.
pub const FALLBACK_TEXT: &str = "I'm having trouble processing your argument right now. \
    Let me think about this differently... I still disagree with your position, but I \
    need a moment to formulate a proper counterargument. Care to elaborate on your \
    reasoning while I gather my thoughts?";

/// Strategy tag recorded on a round that used the fallback response.
pub const FALLBACK_STRATEGY: &str = "fallback";

/// Build the degraded response used when generation fails.
#[must_use]
pub fn fallback_response() -> GeneratedResponse {
    GeneratedResponse {
        text: FALLBACK_TEXT.to_string(),
        confidence: 0.3,
        sources: Vec::new(),
        reasoning: "Fallback counterargument".to_string(),
    }
}

/// Opaque response generation seam.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a rebuttal to `user_text` using `strategy`.
    ///
    /// `topic` is the debate context string used inside templates;
    /// `recent_history` is the trailing transcript window (at most
    /// three messages).
    async fn generate(
        &self,
        user_text: &str,
        analysis: &ArgumentAnalysis,
        strategy: &Strategy,
        topic: &str,
        recent_history: &[Message],
    ) -> anyhow::Result<GeneratedResponse>;
}

/// How a strategy renders into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerationMode {
    Socratic,
    EvidenceChallenge,
    LogicalDeconstruction,
    Reframe,
    CounterExample,
    Generic,
}

impl GenerationMode {
    /// Strategies without a dedicated mode render generically.
    fn for_strategy(name: &str) -> Self {
        match name {
            "socratic-questioning" => Self::Socratic,
            "evidence-challenge" => Self::EvidenceChallenge,
            "logical-deconstruction" => Self::LogicalDeconstruction,
            "reframe-perspective" => Self::Reframe,
            "counter-example" => Self::CounterExample,
            _ => Self::Generic,
        }
    }
}

const MOCK_SOURCE_BASES: [&str; 4] = [
    "Journal of Advanced Research",
    "International Review of Studies",
    "Proceedings of the Academic Conference",
    "Peer-Reviewed Analysis Report",
];

/// Deterministic template-driven generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseGenerator for TemplateGenerator {
    async fn generate(
        &self,
        user_text: &str,
        analysis: &ArgumentAnalysis,
        strategy: &Strategy,
        topic: &str,
        recent_history: &[Message],
    ) -> anyhow::Result<GeneratedResponse> {
        let slot = recent_history.len();
        let response = match GenerationMode::for_strategy(strategy.name) {
            GenerationMode::Socratic => socratic(user_text, analysis, topic, slot),
            GenerationMode::EvidenceChallenge => evidence_challenge(user_text, analysis, topic, slot),
            GenerationMode::LogicalDeconstruction => logical_deconstruction(user_text, analysis, topic),
            GenerationMode::Reframe => reframe(user_text, topic),
            GenerationMode::CounterExample => counter_example(user_text, topic),
            GenerationMode::Generic => generic(user_text, analysis, topic),
        };
        Ok(response)
    }
}

/// First non-empty '.'-sentence, else a 100-char truncation.
fn key_phrase(text: &str) -> String {
    text.split('.')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map_or_else(
            || {
                let head: String = text.chars().take(100).collect();
                format!("{head}...")
            },
            ToString::to_string,
        )
}

fn socratic(user_text: &str, analysis: &ArgumentAnalysis, topic: &str, slot: usize) -> GeneratedResponse {
    let key = key_phrase(user_text);
    let questions = [
        format!(
            "I'm curious about your reasoning here. When you say \"{key}\", what exactly do \
             you mean by that?"
        ),
        "That's an interesting perspective. What evidence led you to be so confident in this \
         conclusion?"
            .to_string(),
        format!(
            "Help me understand - what assumptions are you making about {topic} that might \
             influence this view?"
        ),
        "I wonder, how would you respond to someone who might argue the opposite? What would \
         you say to them?"
            .to_string(),
    ];
    let question = &questions[slot % questions.len()];
    let challenge = weakness_challenge(&analysis.weaknesses);

    GeneratedResponse {
        text: format!(
            "{question} I ask because there seem to be some aspects of this argument that \
             deserve deeper examination. {challenge}"
        ),
        confidence: 0.8,
        sources: Vec::new(),
        reasoning: "Using Socratic questioning to expose assumptions and reasoning gaps"
            .to_string(),
    }
}

fn evidence_challenge(
    user_text: &str,
    analysis: &ArgumentAnalysis,
    topic: &str,
    slot: usize,
) -> GeneratedResponse {
    let openers = [
        "I'd like to examine the evidence you're citing more closely.",
        "While you've presented some data, I have concerns about its interpretation.",
        "The research you're referencing may not support your conclusion as strongly as you think.",
    ];
    let opener = openers[slot % openers.len()];
    let specific = evidence_specific_challenge(user_text, analysis);

    GeneratedResponse {
        text: format!(
            "{opener} {specific} This matters because evidence quality is crucial when \
             discussing {topic}. Have you considered alternative interpretations of this data?"
        ),
        confidence: 0.85,
        sources: mock_sources(topic),
        reasoning: "Challenging evidence quality and interpretation".to_string(),
    }
}

fn logical_deconstruction(
    user_text: &str,
    analysis: &ArgumentAnalysis,
    topic: &str,
) -> GeneratedResponse {
    let key = key_phrase(user_text);
    let flaw = logical_flaw(&analysis.fallacies);

    GeneratedResponse {
        text: format!(
            "Let me examine the logical structure of your argument. You seem to be arguing \
             that {key}, but there's a gap in the reasoning here. {flaw} If we follow this \
             logic consistently, we'd also have to accept some problematic conclusions about \
             {topic}. The argument breaks down at this logical connection."
        ),
        confidence: 0.9,
        sources: Vec::new(),
        reasoning: "Systematic deconstruction of logical structure".to_string(),
    }
}

fn reframe(user_text: &str, topic: &str) -> GeneratedResponse {
    let key = key_phrase(user_text);
    let frame = alternative_frame(topic);

    GeneratedResponse {
        text: format!(
            "I see this differently. While you're focusing on {key}, consider this \
             alternative perspective: {frame}. This reframing reveals some assumptions in \
             your argument that might not hold up under scrutiny. When we look at {topic} \
             through this lens, your conclusion becomes much less certain."
        ),
        confidence: 0.75,
        sources: Vec::new(),
        reasoning: "Reframing the issue from a different perspective".to_string(),
    }
}

fn counter_example(user_text: &str, topic: &str) -> GeneratedResponse {
    let key = key_phrase(user_text);
    let example = counterexample_for(topic);

    GeneratedResponse {
        text: format!(
            "Your argument relies on a generalization that doesn't hold up to scrutiny. \
             Consider this counterexample: {example}. This case directly contradicts your \
             claim that {key}. If your reasoning were sound, how would you account for this \
             exception? The existence of such counterexamples suggests your argument is \
             overgeneralized."
        ),
        confidence: 0.8,
        sources: Vec::new(),
        reasoning: "Providing specific counterexamples to challenge generalizations".to_string(),
    }
}

fn generic(user_text: &str, analysis: &ArgumentAnalysis, topic: &str) -> GeneratedResponse {
    let key = key_phrase(user_text);
    let challenge = weakness_challenge(&analysis.weaknesses);

    GeneratedResponse {
        text: format!(
            "I disagree with your position on {topic}. While you argue that {key}, this \
             perspective overlooks several important considerations. {challenge} A more \
             nuanced view would recognize the complexity of this issue and avoid such \
             definitive conclusions."
        ),
        confidence: 0.7,
        sources: Vec::new(),
        reasoning: "Generic counterargument approach".to_string(),
    }
}

/// Sentence targeting the first detected weakness. Empty when none.
fn weakness_challenge(weaknesses: &[String]) -> String {
    let Some(weakness) = weaknesses.first() else {
        return String::new();
    };
    match weakness.as_str() {
        "Over-reliance on personal opinion" => {
            "Personal opinions, while valid, don't constitute evidence for broader claims."
        }
        "Unsupported assumptions" => {
            "You're making several assumptions here that aren't necessarily true."
        }
        "Overgeneralization" => "This generalization ignores important exceptions and nuances.",
        _ => "There are some logical issues with this reasoning.",
    }
    .to_string()
}

fn evidence_specific_challenge(user_text: &str, analysis: &ArgumentAnalysis) -> &'static str {
    if analysis.evidence_quality < 5 {
        return "The evidence quality here is questionable - we need more rigorous sources.";
    }
    if user_text.to_lowercase().contains("study") {
        return "What was the methodology of this study? Sample size matters, and so does \
                peer review.";
    }
    "The interpretation of this evidence seems selective and potentially misleading."
}

/// Explanation of the first detected fallacy.
fn logical_flaw(fallacies: &[String]) -> String {
    let Some(fallacy) = fallacies.first() else {
        return "The logical connection between your premises and conclusion is weak.".to_string();
    };
    match fallacy.as_str() {
        "Bandwagon fallacy" => "Just because many people believe something doesn't make it true.",
        "Slippery slope" => "You're assuming a chain reaction that isn't necessarily inevitable.",
        "Straw man" => "You're misrepresenting the opposing position to make it easier to attack.",
        _ => "There's a logical fallacy in your reasoning.",
    }
    .to_string()
}

/// Room-specific reframes; anything unrecognized gets the generic line.
fn alternative_frame(topic: &str) -> &'static str {
    match topic {
        "Law" => "instead of focusing on legal precedent, consider the underlying principles \
                  of justice",
        "Politics" => "rather than partisan positions, think about what actually serves \
                       citizens best",
        "Ethics" => "beyond individual rights, consider collective responsibility and harm",
        "Cultural" => "instead of traditional practices, focus on evolving social needs",
        "Technology" => "rather than technical possibilities, consider human and societal \
                         implications",
        _ => "there's a completely different way to approach this issue",
    }
}

fn counterexample_for(topic: &str) -> &'static str {
    match topic {
        "Law" => "the landmark case that established an exception to this legal principle",
        "Politics" => "the policy that succeeded despite conventional wisdom suggesting it \
                       would fail",
        "Ethics" => "the situation where this moral principle leads to clearly unethical \
                     outcomes",
        "Cultural" => "the culture that thrives despite rejecting this supposedly universal \
                       norm",
        "Technology" => "the technology that was adopted successfully despite violating this \
                         assumption",
        _ => "a clear example that contradicts your general claim",
    }
}

/// Two canned citations formatted for the topic.
fn mock_sources(topic: &str) -> Vec<String> {
    MOCK_SOURCE_BASES
        .iter()
        .take(2)
        .map(|base| format!("{base} on {topic} (2024)"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ArgumentAnalyzer;
    use crate::strategy::StrategyCatalog;

    fn analysis_for(text: &str) -> ArgumentAnalysis {
        ArgumentAnalyzer::new().analyze(text, "Ethics", &[])
    }

    async fn generate(strategy_name: &str, text: &str, history_len: usize) -> GeneratedResponse {
        let catalog = StrategyCatalog::new();
        let strategy = catalog.get(strategy_name).unwrap();
        let history: Vec<Message> = (0..history_len).map(|i| Message::user(format!("m{i}"))).collect();
        TemplateGenerator::new()
            .generate(text, &analysis_for(text), strategy, "Ethics", &history)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_mode_confidence_constants() {
        let text = "I think this is right. It always works.";
        assert!((generate("socratic-questioning", text, 0).await.confidence - 0.8).abs() < f32::EPSILON);
        assert!((generate("evidence-challenge", text, 0).await.confidence - 0.85).abs() < f32::EPSILON);
        assert!((generate("logical-deconstruction", text, 0).await.confidence - 0.9).abs() < f32::EPSILON);
        assert!((generate("reframe-perspective", text, 0).await.confidence - 0.75).abs() < f32::EPSILON);
        assert!((generate("counter-example", text, 0).await.confidence - 0.8).abs() < f32::EPSILON);
        // Strategies without a dedicated mode render generically.
        assert!((generate("scope-limitation", text, 0).await.confidence - 0.7).abs() < f32::EPSILON);
        assert!((generate("practical-concerns", text, 0).await.confidence - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_only_evidence_challenge_cites_sources() {
        let text = "A study shows this. The data is clear.";
        let ev = generate("evidence-challenge", text, 0).await;
        assert_eq!(ev.sources.len(), 2);
        assert!(ev.sources[0].contains("on Ethics (2024)"));
        for name in ["socratic-questioning", "logical-deconstruction", "reframe-perspective"] {
            assert!(generate(name, text, 0).await.sources.is_empty(), "{name} cited sources");
        }
    }

    #[tokio::test]
    async fn test_socratic_slot_rotates_with_history_length() {
        let text = "Cats are great. They purr.";
        let a = generate("socratic-questioning", text, 0).await;
        let b = generate("socratic-questioning", text, 1).await;
        let c = generate("socratic-questioning", text, 4).await;
        assert_ne!(a.text, b.text);
        // Slot is history length mod 4, so 4 wraps back to slot 0.
        assert_eq!(a.text, c.text);
    }

    #[tokio::test]
    async fn test_key_phrase_is_first_sentence() {
        let r = generate("logical-deconstruction", "Dogs bark loudly. Cats meow.", 0).await;
        assert!(r.text.contains("arguing that Dogs bark loudly,"));
    }

    #[test]
    fn test_key_phrase_picks_first_sentence_or_falls_back() {
        assert_eq!(key_phrase("Dogs bark. Cats meow."), "Dogs bark");
        // Leading empty segments are skipped.
        assert_eq!(key_phrase(". . Dogs bark."), "Dogs bark");
        // No usable sentence at all: truncated echo of the raw text.
        assert_eq!(key_phrase(""), "...");
    }

    #[tokio::test]
    async fn test_evidence_branch_low_quality() {
        // No evidence keywords: quality stays at base 3.
        let r = generate("evidence-challenge", "It just works. Trust me.", 0).await;
        assert!(r.text.contains("The evidence quality here is questionable"));
    }

    #[tokio::test]
    async fn test_evidence_branch_study_methodology() {
        let r = generate(
            "evidence-challenge",
            "A peer-reviewed study with published data and statistics proves it. Really.",
            0,
        )
        .await;
        assert!(r.text.contains("What was the methodology of this study?"));
    }

    #[tokio::test]
    async fn test_logical_flaw_names_first_fallacy() {
        let r = generate(
            "logical-deconstruction",
            "Everyone thinks so. If we ban it, then chaos follows.",
            0,
        )
        .await;
        assert!(r.text.contains("Just because many people believe something"));
    }

    #[tokio::test]
    async fn test_unknown_topic_uses_generic_tables() {
        let catalog = StrategyCatalog::new();
        let strategy = catalog.get("reframe-perspective").unwrap();
        let text = "This is fine. Nothing will change.";
        let r = TemplateGenerator::new()
            .generate(text, &analysis_for(text), strategy, "Underwater Basketweaving", &[])
            .await
            .unwrap();
        assert!(r.text.contains("a completely different way to approach this issue"));
    }

    #[test]
    fn test_fallback_response_shape() {
        let r = fallback_response();
        assert_eq!(r.text, FALLBACK_TEXT);
        assert!((r.confidence - 0.3).abs() < f32::EPSILON);
        assert!(r.sources.is_empty());
    }
}
