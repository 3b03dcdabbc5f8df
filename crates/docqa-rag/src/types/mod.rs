//! Core types for the document Q&A system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, DocumentRecord, FileType};
pub use query::{AskRequest, ChallengeRequest, EvaluationRequest, RetrieveRequest, SummarizeRequest};
pub use response::{
    AskResponse, ChallengeProgress, ChallengeQuestion, ChallengeResponse, DocumentInfo,
    DocumentListResponse, EvaluationResponse, RetrieveResponse, RetrievedChunk, SummaryResponse,
    UploadResponse,
};
