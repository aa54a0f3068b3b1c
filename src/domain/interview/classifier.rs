//! Keyword heuristic for mapping turn content to a friction dimension.
//!
//! Known limits: a turn can discuss a dimension without matching any keyword
//! (false negative) or match a keyword belonging to an unrelated dimension
//! (false positive). The contract the orchestrator relies on is narrower than
//! accuracy: at most one dimension is credited per turn, and full coverage is
//! still required before extraction.

use once_cell::sync::Lazy;

use crate::domain::foundation::Dimension;

static DIMENSION_KEYWORDS: Lazy<Vec<(Dimension, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Dimension::Clarity,
            vec![
                "requirements",
                "unclear",
                "objectives",
                "expectations",
                "understand",
                "definition",
            ],
        ),
        (
            Dimension::Tooling,
            vec![
                "tools",
                "software",
                "systems",
                "technology",
                "equipment",
                "applications",
            ],
        ),
        (
            Dimension::Process,
            vec![
                "process",
                "workflow",
                "procedure",
                "steps",
                "bureaucracy",
                "approval",
            ],
        ),
        (
            Dimension::Rework,
            vec!["redo", "rework", "revision", "change", "mistake", "error", "fix"],
        ),
        (
            Dimension::Delay,
            vec!["wait", "delay", "block", "stuck", "pending", "queue", "slow"],
        ),
        (
            Dimension::Safety,
            vec![
                "comfortable",
                "safe",
                "fear",
                "concern",
                "speak up",
                "admit",
                "help",
            ],
        ),
    ]
});

/// Guesses which dimension a turn addressed from its combined text.
///
/// Checks dimensions in canonical order and returns the first with a keyword
/// match, so a multi-topic turn is credited for exactly one dimension.
pub fn classify_dimension(user_content: &str, assistant_content: &str) -> Option<Dimension> {
    let combined = format!("{} {}", assistant_content, user_content).to_lowercase();

    for (dimension, keywords) in DIMENSION_KEYWORDS.iter() {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            return Some(*dimension);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_dimension_from_a_distinct_keyword() {
        let cases = [
            ("the requirements keep shifting", Dimension::Clarity),
            ("our software crashes daily", Dimension::Tooling),
            ("too much bureaucracy", Dimension::Process),
            ("I had to redo the report", Dimension::Rework),
            ("stuck in the review queue", Dimension::Delay),
            ("I don't feel comfortable raising issues", Dimension::Safety),
        ];
        for (text, expected) in cases {
            assert_eq!(classify_dimension(text, ""), Some(expected), "{}", text);
        }
    }

    #[test]
    fn matching_is_case_insensitive_and_covers_both_speakers() {
        assert_eq!(
            classify_dimension("nothing notable", "How well do your TOOLS support you?"),
            Some(Dimension::Tooling)
        );
    }

    #[test]
    fn multi_topic_turn_credits_exactly_one_dimension() {
        // Touches both clarity and delay; clarity comes first in canonical order.
        let detected = classify_dimension("the requirements were unclear so we had to wait", "");
        assert_eq!(detected, Some(Dimension::Clarity));
    }

    #[test]
    fn unrelated_text_matches_nothing() {
        assert_eq!(classify_dimension("my commute is long", "Tell me more."), None);
    }
}
