//! Ask, summarize, challenge and evaluate

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::ingestion::IngestPipeline;
use crate::providers::LlmProvider;
use crate::session::SessionStore;
use crate::types::{
    AskResponse, ChallengeQuestion, ChallengeResponse, EvaluationResponse, RetrievedChunk,
};

use super::parse::{parse_challenge_questions, parse_score};
use super::prompt::PromptBuilder;

/// Answer used when retrieval finds nothing
pub const NO_RELEVANT_INFO: &str = "No relevant information found.";

/// Summary used when a document has no stored content
pub const NO_SUMMARY_CONTENT: &str = "No content available for summary.";

/// Characters of document content shown to the model for challenge questions
const CHALLENGE_CONTENT_CHARS: usize = 1000;

/// Upper bound on challenge questions per session
pub const MAX_CHALLENGE_QUESTIONS: usize = 5;

/// Composes retrieval and an LLM provider into the user-facing operations
pub struct Assistant {
    pipeline: Arc<IngestPipeline>,
    llm: Arc<dyn LlmProvider>,
    sessions: Arc<SessionStore>,
    summary_max_words: usize,
    default_questions: usize,
    default_top_k: usize,
    retrieval_timeout: Duration,
}

impl Assistant {
    /// Create an assistant from shared handles
    pub fn new(
        config: &RagConfig,
        pipeline: Arc<IngestPipeline>,
        llm: Arc<dyn LlmProvider>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            pipeline,
            llm,
            sessions,
            summary_max_words: config.assistant.summary_max_words,
            default_questions: config.assistant.num_challenge_questions,
            default_top_k: config.processing.default_top_k,
            retrieval_timeout: Duration::from_secs(config.processing.retrieval_timeout_secs),
        }
    }

    /// Session registry
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// LLM provider in use
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Retrieval context bounded by the configured timeout; a timeout yields no context
    pub async fn context(&self, query: &str, doc_ids: &[String], top_k: Option<usize>) -> Vec<RetrievedChunk> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        match tokio::time::timeout(
            self.retrieval_timeout,
            self.pipeline.answer_context(query, doc_ids, top_k),
        )
        .await
        {
            Ok(chunks) => chunks,
            Err(_) => {
                tracing::warn!(
                    "Retrieval over {} documents timed out after {:?}",
                    doc_ids.len(),
                    self.retrieval_timeout
                );
                Vec::new()
            }
        }
    }

    /// Answer a question from the given documents
    pub async fn ask(&self, question: &str, doc_ids: &[String], top_k: Option<usize>) -> Result<AskResponse> {
        let chunks = self.context(question, doc_ids, top_k).await;

        let answer = if chunks.is_empty() {
            tracing::info!("No context for question over {} documents", doc_ids.len());
            NO_RELEVANT_INFO.to_string()
        } else {
            let context = PromptBuilder::build_context(&chunks);
            self.llm
                .generate(&PromptBuilder::build_ask_prompt(question, &context))
                .await?
        };

        Ok(AskResponse {
            question: question.to_string(),
            answer,
            source_chunks: chunks,
            session_id: Uuid::new_v4(),
        })
    }

    /// Full stored text of a document, chunks joined in order
    fn document_content(&self, doc_id: &str) -> String {
        self.pipeline
            .store()
            .get_chunks(doc_id)
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Bullet-point summary of a stored document
    pub async fn summarize(&self, doc_id: &str) -> Result<String> {
        let content = self.document_content(doc_id);
        if content.trim().is_empty() {
            return Ok(NO_SUMMARY_CONTENT.to_string());
        }

        self.llm
            .generate(&PromptBuilder::build_summary_prompt(&content, self.summary_max_words))
            .await
    }

    /// Generate challenge questions and open a session for them
    pub async fn challenge(&self, doc_id: &str, num_questions: Option<usize>) -> Result<ChallengeResponse> {
        let content = self.document_content(doc_id);
        if content.trim().is_empty() {
            return Err(Error::NotFound(format!("No content available for document {}", doc_id)));
        }

        let n = num_questions
            .unwrap_or(self.default_questions)
            .clamp(1, MAX_CHALLENGE_QUESTIONS);
        let excerpt: String = content.chars().take(CHALLENGE_CONTENT_CHARS).collect();

        let reply = self
            .llm
            .generate(&PromptBuilder::build_challenge_prompt(&excerpt, n))
            .await?;
        let questions: Vec<ChallengeQuestion> = parse_challenge_questions(&reply, n);

        let session_id = self.sessions.create(doc_id, questions.clone());
        tracing::info!(
            "Challenge session {} for {} with {} questions",
            session_id,
            doc_id,
            questions.len()
        );

        Ok(ChallengeResponse {
            session_id,
            total_questions: questions.len(),
            questions,
        })
    }

    /// Grade an answer to a challenge question
    pub async fn evaluate(&self, session_id: Uuid, question_id: Uuid, user_answer: &str) -> Result<EvaluationResponse> {
        let (doc_id, question) = self.sessions.question(session_id, question_id)?;

        let reference_chunks = self
            .context(&question.question, std::slice::from_ref(&doc_id), None)
            .await;
        let context = PromptBuilder::build_context(&reference_chunks);

        let feedback = self
            .llm
            .generate(&PromptBuilder::build_evaluation_prompt(
                &question.question,
                user_answer,
                &context,
            ))
            .await?;
        let score = parse_score(&feedback);

        self.sessions.record_score(session_id, question_id, score)?;

        Ok(EvaluationResponse {
            question_id,
            score,
            feedback,
            reference_chunks,
        })
    }
}
