//! Request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ask a question across one or more documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    #[serde(default)]
    pub question: String,
    /// Documents to search
    #[serde(default)]
    pub document_ids: Vec<String>,
    /// Chunks retrieved per document (default from config)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Raw retrieval without generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    /// Query text
    pub query: String,
    /// Documents to search
    pub document_ids: Vec<String>,
    /// Chunks retrieved per document (default from config)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Summarize a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub document_id: String,
}

/// Generate comprehension questions for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub document_id: String,
    /// Number of questions (1-5, default from config)
    #[serde(default)]
    pub num_questions: Option<usize>,
}

/// Evaluate an answer to a challenge question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub user_answer: String,
}
