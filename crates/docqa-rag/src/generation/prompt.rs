//! Prompt templates for document Q&A

use crate::types::RetrievedChunk;

/// Marker separating a challenge question from its reasoning
pub const REASONING_MARKER: &str = "\nReasoning:";

/// Prompt builder for assistant operations
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts into a context block
    pub fn build_context(chunks: &[RetrievedChunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Grounded question answering
    pub fn build_ask_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a document-grounded assistant. Use ONLY the context below.
If the answer is not in the context, say that the documents do not contain it.

Context:
{context}

Question: {question}
Answer concisely in markdown format."#,
            context = context,
            question = question
        )
    }

    /// Bullet-point summary under a word budget
    pub fn build_summary_prompt(content: &str, max_words: usize) -> String {
        format!(
            "Summarize the following content in 3-5 bullet points, under {} words:\n{}",
            max_words, content
        )
    }

    /// Challenge questions, one block per question separated by blank lines
    pub fn build_challenge_prompt(content: &str, num_questions: usize) -> String {
        format!(
            r#"Generate {n} challenging questions with reasoning based on this content.

Format each question as its own block, separated by a blank line:
<question text>
Reasoning: <why this question tests understanding of the content>

Content:
{content}"#,
            n = num_questions,
            content = content
        )
    }

    /// Grade an answer to a challenge question against reference context
    pub fn build_evaluation_prompt(question: &str, user_answer: &str, context: &str) -> String {
        format!(
            r#"Evaluate this answer for correctness and relevance to the question, using ONLY the reference context.

Question: {question}

Answer: {answer}

Reference context:
{context}

Start your reply with a line of the form "Score: N" where N is an integer from 0 to 100, then give feedback citing the reference context."#,
            question = question,
            answer = user_answer,
            context = context
        )
    }
}
