//! Assistant operations on top of retrieval and an LLM provider

pub mod assistant;
pub mod parse;
pub mod prompt;

pub use assistant::Assistant;
pub use parse::{parse_challenge_questions, parse_score, DEFAULT_REASONING};
pub use prompt::PromptBuilder;
