//! Document ingestion: identity, text extraction, chunking and orchestration

pub mod chunker;
pub mod identity;
pub mod parser;
pub mod pipeline;

pub use chunker::TextChunker;
pub use identity::identify;
pub use parser::{FileParser, TextExtractor};
pub use pipeline::{IngestOutcome, IngestPipeline, DEFAULT_TOP_K};
