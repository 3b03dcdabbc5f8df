//! docqa-rag: document Q&A with content-addressed ingestion and per-document retrieval
//!
//! Uploaded pdf, txt and docx files are identified by a hash of their bytes,
//! split into sentence-atomic chunks, embedded and stored as one collection per
//! document. Questions are answered from the nearest chunks of the selected
//! documents through a pluggable LLM provider.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{identify, IngestOutcome, IngestPipeline, TextChunker};
pub use retrieval::{ChunkStore, DistanceMetric};
pub use types::{Chunk, ChunkMetadata, FileType, RetrievedChunk};
