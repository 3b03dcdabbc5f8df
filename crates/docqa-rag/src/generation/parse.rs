//! Parsing of structured LLM replies

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::types::ChallengeQuestion;

use super::prompt::REASONING_MARKER;

/// Reasoning used when the model gives none
pub const DEFAULT_REASONING: &str = "Based on document content.";

fn score_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)score\s*:\s*(\d+)").ok())
        .as_ref()
}

/// Split a challenge reply into at most `limit` questions
///
/// Blocks are separated by blank lines; the first `limit` blocks are taken and
/// empty ones dropped. Within a block, text before `"\nReasoning:"` is the
/// question and text after it the reasoning.
pub fn parse_challenge_questions(reply: &str, limit: usize) -> Vec<ChallengeQuestion> {
    let reply = reply.replace("\r\n", "\n");

    reply
        .split("\n\n")
        .take(limit)
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let (question, reasoning) = match block.split_once(REASONING_MARKER) {
                Some((question, reasoning)) => (question.trim(), reasoning.trim()),
                None => (block.trim(), DEFAULT_REASONING),
            };
            ChallengeQuestion {
                question_id: Uuid::new_v4(),
                question: question.to_string(),
                reasoning: reasoning.to_string(),
            }
        })
        .collect()
}

/// First `Score: N` in an evaluation reply, clamped to 0..=100; 0 if absent
pub fn parse_score(reply: &str) -> u8 {
    score_pattern()
        .and_then(|re| re.captures(reply))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().parse::<u64>().map_or(100, |n| n.min(100)) as u8)
        .unwrap_or(0)
}
