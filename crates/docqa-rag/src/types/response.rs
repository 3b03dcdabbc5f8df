//! Response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{ChunkMetadata, DocumentRecord, FileType};

/// A chunk returned by nearest-neighbour retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedChunk {
    /// Chunk text
    pub text: String,
    /// Chunk ID (`{doc_id}_chunk_{index}`)
    pub id: String,
    /// Distance to the query (lower is closer)
    pub distance: f32,
    /// Positional anchor
    pub metadata: ChunkMetadata,
}

/// Response from the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub chunk_count: usize,
    /// Auto-generated summary (empty if generation failed)
    pub summary: String,
    pub success: bool,
    pub message: String,
}

/// Response from the ask endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    /// Chunks the answer was grounded on, per document closest-first
    pub source_chunks: Vec<RetrievedChunk>,
    pub session_id: Uuid,
}

/// Response from the retrieve endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub query: String,
    pub results: Vec<RetrievedChunk>,
}

/// Response from the summarize endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// A generated comprehension question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeQuestion {
    pub question_id: Uuid,
    pub question: String,
    /// Why this question tests comprehension
    pub reasoning: String,
}

/// Response from the challenge endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub session_id: Uuid,
    pub questions: Vec<ChallengeQuestion>,
    pub total_questions: usize,
}

/// Response from the evaluate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub question_id: Uuid,
    /// Score out of 100
    pub score: u8,
    pub feedback: String,
    pub reference_chunks: Vec<RetrievedChunk>,
}

/// Progress through a challenge session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeProgress {
    pub session_id: Uuid,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub average_score: f32,
}

/// Document summary for list views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub filename: String,
    pub file_type: FileType,
    pub chunk_count: usize,
    pub summary: Option<String>,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&DocumentRecord> for DocumentInfo {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            document_id: doc.doc_id.clone(),
            filename: doc.filename.clone(),
            file_type: doc.file_type,
            chunk_count: doc.chunk_count,
            summary: doc.summary.clone(),
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Document list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentInfo>,
    pub total_count: usize,
}
