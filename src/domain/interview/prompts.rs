//! Prompt templates for the interview conversation.
//!
//! Everything the text generator is asked for is built here, so a prompt
//! change never touches orchestration code. Deterministic fallback copy for
//! generator outages lives here too.

use crate::domain::foundation::Dimension;
use crate::domain::interview::Message;

/// Bumped whenever prompt wording changes in a way that could shift scores.
pub const PROMPT_VERSION: &str = "1.0";

/// Sampling temperature for the open conversation, opening included.
pub const CONVERSATION_TEMPERATURE: f32 = 0.7;
/// Confirmation prompts stay closer to the template.
pub const CONFIRMATION_TEMPERATURE: f32 = 0.5;
/// Extraction runs cold so repeated runs score the same transcript alike.
pub const EXTRACTION_TEMPERATURE: f32 = 0.3;
/// Summaries sit between extraction and conversation.
pub const SUMMARY_TEMPERATURE: f32 = 0.4;

pub const SYSTEM_PROMPT: &str = "\
You are a friendly and empathetic workplace experience researcher conducting a \
semi-structured interview to understand friction and challenges in someone's work.

Your goals:
1. Build rapport and make the participant comfortable
2. Explore all 6 friction dimensions through natural conversation
3. Listen actively and probe deeper based on their responses
4. Infer friction ratings (1-5 scale) from the conversation
5. Be warm but professional

The 6 friction dimensions you need to cover:
1. Clarity - Clear requirements, objectives, and expectations
2. Tooling - Effectiveness of tools and systems
3. Process - How well processes support efficient work
4. Rework - Frequency of redoing work
5. Delay - Waiting times and blocked work
6. Safety - Psychological safety and ability to raise concerns

Interview guidelines:
- Start with an open question about their work day or recent challenges
- Let the conversation flow naturally, but ensure all dimensions are covered
- Use follow-up questions to understand severity and frequency
- Be empathetic when they share challenges
- Look for specific examples and stories
- Keep responses concise but warm (2-4 sentences typically)
- Don't ask about multiple dimensions in one question
- Don't be too formal or survey-like

Rating scale (1-5):
1 = Significant friction/problems
2 = Frequent friction
3 = Moderate friction
4 = Occasional minor friction
5 = No friction/smooth

Remember: This is a conversation, not an interrogation. Your goal is to \
understand their experience.";

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are an expert at analyzing workplace conversations to extract friction scores.

Given a conversation transcript, analyze the participant's responses to determine \
friction levels for each dimension.

For each dimension, provide:
1. A score from 1-5 (1 = significant friction, 5 = no friction)
2. Your confidence level (0-1)
3. Brief reasoning (1-2 sentences)
4. Key quotes that support your rating (if any)

Be objective and base your assessment on what was actually said, not assumptions.
If a dimension wasn't adequately discussed, indicate lower confidence.";

// ─── dimension profiles ──────────────────────────────────────────────────────

/// Static interviewing guidance for one friction dimension.
pub struct DimensionProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub probing_topics: [&'static str; 3],
}

/// Interviewing guidance for the given dimension.
pub fn profile(dimension: Dimension) -> &'static DimensionProfile {
    match dimension {
        Dimension::Clarity => &DimensionProfile {
            name: "Clarity",
            description: "Clear requirements, objectives, and expectations",
            probing_topics: [
                "How well-defined are your work requirements?",
                "Do you understand what success looks like?",
                "Are expectations clearly communicated?",
            ],
        },
        Dimension::Tooling => &DimensionProfile {
            name: "Tooling",
            description: "Effectiveness and availability of tools and systems",
            probing_topics: [
                "How well do your tools support your work?",
                "Are there tool limitations that slow you down?",
                "Do you have the right technology for your tasks?",
            ],
        },
        Dimension::Process => &DimensionProfile {
            name: "Process",
            description: "How well processes support efficient work",
            probing_topics: [
                "Are your workflows well-designed?",
                "Do processes help or hinder your work?",
                "Is there unnecessary bureaucracy?",
            ],
        },
        Dimension::Rework => &DimensionProfile {
            name: "Rework",
            description: "Frequency of redoing work due to issues",
            probing_topics: [
                "How often do you need to redo completed work?",
                "What typically causes rework?",
                "Are changes to requirements common?",
            ],
        },
        Dimension::Delay => &DimensionProfile {
            name: "Delay",
            description: "Waiting times and blocked work",
            probing_topics: [
                "How often are you blocked waiting for others?",
                "What causes delays in your work?",
                "Are approvals and handoffs smooth?",
            ],
        },
        Dimension::Safety => &DimensionProfile {
            name: "Safety",
            description: "Psychological safety and ability to raise concerns",
            probing_topics: [
                "Do you feel safe raising concerns?",
                "Can you admit mistakes without fear?",
                "Is it okay to ask for help?",
            ],
        },
    }
}

// ─── prompt builders ─────────────────────────────────────────────────────────

pub fn opening_prompt(occupation_name: &str) -> String {
    format!(
        "Generate a warm, friendly opening message to start an interview about \
workplace friction.\nThe participant works as a {occupation_name}.\n\n\
The message should:\n\
- Be warm and welcoming (not formal)\n\
- Briefly explain this is a conversation about their work experience\n\
- Mention it takes about 10-15 minutes\n\
- Emphasize their responses are anonymous and honest feedback is valued\n\
- End with an open question about their typical work day or recent challenges\n\n\
Keep it concise (3-4 sentences max) and conversational."
    )
}

pub fn response_prompt(context: &str, covered: &[Dimension]) -> String {
    let remaining: Vec<&str> = Dimension::ALL
        .iter()
        .filter(|d| !covered.contains(d))
        .map(|d| profile(*d).name)
        .collect();
    let remaining_names = if remaining.is_empty() {
        "All covered".to_string()
    } else {
        remaining.join(", ")
    };

    format!(
        "Continue the conversation naturally based on what the participant just shared.\n\n\
Conversation so far:\n{context}\n\n\
Dimensions still to explore: {remaining_names}\n\n\
Generate a response that:\n\
- Acknowledges what they shared (briefly)\n\
- If they mentioned a challenge, shows empathy\n\
- Naturally transitions to explore an uncovered dimension (if any remain)\n\
- Keeps the conversation flowing\n\n\
Keep it to 2-3 sentences. Be conversational, not interview-like."
    )
}

pub fn rating_confirmation_prompt(dimension: Dimension, inferred_score: f64) -> String {
    let info = profile(dimension);
    let score_label = match inferred_score.round() as i64 {
        1 => "significant challenges",
        2 => "frequent friction",
        3 => "moderate friction",
        4 => "occasional minor issues",
        5 => "things are going smoothly",
        _ => "some friction",
    };

    format!(
        "Generate a friendly message to confirm the participant's rating for {name}.\n\n\
Based on our conversation about {name}, I'd estimate {score_label} (around {score:.0} out of 5).\n\n\
Generate a message that:\n\
- Summarizes what you understood about their experience with {name}\n\
- States the inferred rating naturally (don't say \"I'm rating you\")\n\
- Asks if that feels accurate or if they'd adjust it\n\
- Is warm and non-judgmental\n\n\
Example format: \"From what you've shared about [topic], it sounds like [brief summary]. \
I'd put that at around [X] out of 5. Does that feel right, or would you rate it differently?\"\n\n\
Keep it to 2-3 sentences.",
        name = info.name,
        score = inferred_score,
    )
}

pub fn extraction_prompt(transcript: &str) -> String {
    let dimensions_list: String = Dimension::ALL
        .iter()
        .map(|d| format!("- {}: {}", d.as_str(), profile(*d).description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this workplace friction interview and extract ratings for each dimension.\n\n\
CONVERSATION TRANSCRIPT:\n{transcript}\n\n\
DIMENSIONS TO RATE:\n{dimensions_list}\n\n\
For each dimension, provide a JSON object with:\n\
- dimension: The dimension name (clarity, tooling, process, rework, delay, safety)\n\
- score: Rating from 1-5 (1=significant friction, 5=no friction)\n\
- confidence: Your confidence 0-1 (lower if dimension wasn't discussed much)\n\
- reasoning: Brief explanation (1-2 sentences)\n\
- key_quotes: Array of relevant quotes from the participant (if any)\n\
- summary_comment: A 1-3 sentence summary of what the participant said about this \
dimension, written in third person as if documenting their feedback\n\n\
Respond with a JSON object containing a \"ratings\" array with one entry per dimension.\n\n\
Example:\n\
{{\n\
  \"ratings\": [\n\
    {{\n\
      \"dimension\": \"clarity\",\n\
      \"score\": 3.5,\n\
      \"confidence\": 0.85,\n\
      \"reasoning\": \"Participant mentioned requirements are sometimes unclear but manageable.\",\n\
      \"key_quotes\": [\"Sometimes I have to ask for clarification\"],\n\
      \"summary_comment\": \"The respondent noted that specific requirements often need clarification.\"\n\
    }}\n\
  ]\n\
}}"
    )
}

pub fn summary_prompt(transcript: &str, ratings: &[(Dimension, f64, f64)]) -> String {
    let ratings_summary: String = ratings
        .iter()
        .map(|(dimension, score, confidence)| {
            format!(
                "- {}: {}/5 (confidence: {:.0}%)",
                dimension.as_str(),
                score,
                confidence * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate an executive summary of this workplace friction interview.\n\n\
CONVERSATION TRANSCRIPT:\n{transcript}\n\n\
EXTRACTED RATINGS:\n{ratings_summary}\n\n\
Generate a JSON response with:\n\
1. executive_summary: 2-3 sentence overview of their experience\n\
2. key_pain_points: Array of {{dimension, description, severity}} for main issues\n\
3. positive_aspects: Array of things that are working well\n\
4. improvement_suggestions: Array of actionable recommendations\n\
5. overall_sentiment: \"positive\", \"neutral\", or \"negative\"\n\
6. dimension_sentiments: Object mapping each dimension to its sentiment\n\n\
Focus on actionable insights. Be objective and base conclusions on the conversation.\n\n\
Example:\n\
{{\n\
  \"executive_summary\": \"The participant experiences moderate friction overall...\",\n\
  \"key_pain_points\": [\n\
    {{\"dimension\": \"delay\", \"description\": \"Frequent waits for approvals\", \"severity\": \"high\"}}\n\
  ],\n\
  \"positive_aspects\": [\"Good team collaboration\"],\n\
  \"improvement_suggestions\": [\"Streamline approval process\"],\n\
  \"overall_sentiment\": \"neutral\",\n\
  \"dimension_sentiments\": {{\"clarity\": \"positive\", \"tooling\": \"negative\"}}\n\
}}"
    )
}

pub fn wrap_up_prompt(context: &str) -> String {
    format!(
        "Generate a wrap-up message as we finish the main conversation.\n\n\
Conversation so far:\n{context}\n\n\
Generate a message that:\n\
- Thanks them for sharing their experiences\n\
- Mentions we'll now quickly confirm a few ratings\n\
- Is warm and appreciative\n\
- Sets expectations for the next step\n\n\
Keep it to 2-3 sentences."
    )
}

// ─── fallback copy ───────────────────────────────────────────────────────────

pub const FALLBACK_FOLLOW_UP: &str = "Thank you for sharing that. Can you tell me \
more about the challenges you face in your day-to-day work?";

pub const FALLBACK_WRAP_UP: &str = "Thank you so much for sharing your experiences \
with me. Let's quickly confirm a few ratings based on our conversation.";

pub fn fallback_opening(occupation_name: &str) -> String {
    format!(
        "Hi! Thanks for taking the time to chat with me today. I'd love to hear \
about your experience working as a {occupation_name}. This is completely \
anonymous and should only take about 10-15 minutes. To start, could you tell me \
about a typical work day, or any recent challenges you've run into?"
    )
}

pub fn fallback_confirmation(dimension: Dimension, inferred_score: f64) -> String {
    format!(
        "Based on our conversation about {}, I'd put your experience at around \
{:.0} out of 5. Does that feel right, or would you rate it differently?",
        profile(dimension).name,
        inferred_score,
    )
}

// ─── transcript formatting ───────────────────────────────────────────────────

/// Renders the most recent `max_messages` as labelled transcript lines.
pub fn format_transcript(messages: &[Message], max_messages: usize) -> String {
    let start = messages.len().saturating_sub(max_messages);
    messages[start..]
        .iter()
        .map(|msg| {
            let label = match msg.role() {
                crate::domain::interview::MessageRole::User => "Participant",
                _ => "Assistant",
            };
            format!("{}: {}", label, msg.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    #[test]
    fn every_dimension_has_a_profile() {
        for dimension in Dimension::ALL {
            let info = profile(dimension);
            assert!(!info.name.is_empty());
            assert!(!info.description.is_empty());
        }
    }

    #[test]
    fn response_prompt_lists_only_uncovered_dimensions() {
        let prompt = response_prompt("Participant: hi", &[Dimension::Clarity]);
        assert!(!prompt.contains("Clarity,"));
        assert!(prompt.contains("Tooling"));
        assert!(prompt.contains("Safety"));
    }

    #[test]
    fn response_prompt_notes_full_coverage() {
        let prompt = response_prompt("Participant: hi", &Dimension::ALL);
        assert!(prompt.contains("All covered"));
    }

    #[test]
    fn extraction_prompt_names_all_wire_dimensions() {
        let prompt = extraction_prompt("Participant: hi");
        for dimension in Dimension::ALL {
            assert!(prompt.contains(dimension.as_str()));
        }
    }

    #[test]
    fn fallback_copy_avoids_classifier_keywords() {
        use crate::domain::interview::classify_dimension;
        assert_eq!(classify_dimension("", FALLBACK_FOLLOW_UP), None);
        assert_eq!(classify_dimension("", FALLBACK_WRAP_UP), None);
        assert_eq!(classify_dimension("", &fallback_opening("nurse")), None);
    }

    #[test]
    fn transcript_keeps_only_recent_messages_with_speaker_labels() {
        let session_id = SessionId::new();
        let messages: Vec<Message> = (0..5)
            .map(|i| {
                if i % 2 == 0 {
                    Message::assistant(session_id, format!("q{i}"), None, i)
                } else {
                    Message::user(session_id, format!("a{i}"), None, i)
                }
            })
            .collect();

        let transcript = format_transcript(&messages, 2);
        assert_eq!(transcript, "Participant: a3\nAssistant: q4");
    }
}
