//! Ingestion pipeline orchestration

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::retrieval::ChunkStore;
use crate::types::{Chunk, FileType, RetrievedChunk};

use super::chunker::TextChunker;
use super::identity::identify;
use super::parser::TextExtractor;

/// Chunks retrieved per document when the caller does not say
pub const DEFAULT_TOP_K: usize = 5;

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Content-hash document ID
    pub doc_id: String,
    /// Detected format
    pub file_type: FileType,
    /// Extracted text
    pub full_text: String,
    /// Chunks as stored
    pub chunks: Vec<Chunk>,
}

/// Main ingestion pipeline: extract, identify, chunk, store
///
/// Holds long-lived handles built once at start-up; cheap to share behind an `Arc`.
pub struct IngestPipeline {
    extractor: Arc<dyn TextExtractor>,
    chunker: TextChunker,
    store: Arc<ChunkStore>,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(extractor: Arc<dyn TextExtractor>, chunker: TextChunker, store: Arc<ChunkStore>) -> Self {
        Self {
            extractor,
            chunker,
            store,
        }
    }

    /// Chunk store behind the pipeline
    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// Extract text from an upload without touching the store
    pub async fn extract(&self, data: Vec<u8>, filename: &str) -> Result<(FileType, String)> {
        let file_type = FileType::from_filename(filename)?;

        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(&data, file_type))
            .await
            // pdf-extract can panic on malformed input; that is still a bad file
            .map_err(|e| Error::extraction(filename, format!("extractor panicked: {}", e)))?
            .map_err(|e| match e {
                // Report the caller's filename, not the extractor's placeholder
                Error::Extraction { message, .. } => Error::extraction(filename, message),
                other => other,
            })?;

        Ok((file_type, text))
    }

    /// Full ingestion; any failing step fails the whole call
    pub async fn ingest(&self, data: Vec<u8>, filename: &str) -> Result<IngestOutcome> {
        let doc_id = identify(&data);
        let size = data.len();
        let (file_type, full_text) = self.extract(data, filename).await?;

        let chunks = self.chunker.chunk(&full_text, &doc_id);
        self.store.store(&chunks, &doc_id).await?;

        tracing::info!(
            "Ingested '{}' as {} ({} bytes, {} chars, {} chunks)",
            filename,
            doc_id,
            size,
            full_text.chars().count(),
            chunks.len()
        );

        Ok(IngestOutcome {
            doc_id,
            file_type,
            full_text,
            chunks,
        })
    }

    /// Retrieval context for a question across documents
    pub async fn answer_context(&self, question: &str, doc_ids: &[String], top_k: usize) -> Vec<RetrievedChunk> {
        self.store.retrieve_multi(question, doc_ids, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::parser::FileParser;
    use crate::providers::HashingEmbedder;
    use crate::retrieval::DistanceMetric;
    use tempfile::TempDir;

    async fn pipeline(dir: &TempDir, bound: usize) -> IngestPipeline {
        let store = ChunkStore::open(dir.path(), Arc::new(HashingEmbedder::new(128)), DistanceMetric::L2)
            .await
            .unwrap();
        IngestPipeline::new(Arc::new(FileParser::new()), TextChunker::new(bound), Arc::new(store))
    }

    #[tokio::test]
    async fn test_ingest_txt() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, 1000).await;
        let data = b"Hello world. This is a test document.".to_vec();

        let outcome = pipeline.ingest(data.clone(), "hello.txt").await.unwrap();
        assert_eq!(outcome.doc_id, identify(&data));
        assert_eq!(outcome.file_type, FileType::Txt);
        assert_eq!(outcome.chunks.len(), 1);
        assert!(pipeline.store().contains(&outcome.doc_id));
    }

    #[tokio::test]
    async fn test_unsupported_format_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, 1000).await;

        let err = pipeline.ingest(b"pixels".to_vec(), "image.png").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(pipeline.store().collections().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_error_names_upload() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, 1000).await;

        let err = pipeline.ingest(vec![0xff, 0xfe, 0xfd], "notes.txt").await.unwrap_err();
        match err {
            Error::Extraction { filename, .. } => assert_eq!(filename, "notes.txt"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(pipeline.store().collections().is_empty());
    }

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, _data: &[u8], _file_type: FileType) -> Result<String> {
            panic!("malformed xref table");
        }
    }

    #[tokio::test]
    async fn test_extractor_panic_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let store = ChunkStore::open(dir.path(), Arc::new(HashingEmbedder::new(128)), DistanceMetric::L2)
            .await
            .unwrap();
        let pipeline = IngestPipeline::new(Arc::new(PanickingExtractor), TextChunker::new(1000), Arc::new(store));

        let err = pipeline.ingest(b"%PDF-1.4".to_vec(), "broken.pdf").await.unwrap_err();
        match err {
            Error::Extraction { filename, .. } => assert_eq!(filename, "broken.pdf"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(pipeline.store().collections().is_empty());

        // The pipeline stays usable afterwards
        let err = pipeline.ingest(b"x".to_vec(), "again.pdf").await.unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_answer_context_uses_store() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(&dir, 40).await;
        let outcome = pipeline
            .ingest(
                b"Cats sleep a lot. Machine learning needs data. Rivers flow to the sea.".to_vec(),
                "mixed.txt",
            )
            .await
            .unwrap();

        let context = pipeline
            .answer_context("machine learning", &[outcome.doc_id.clone()], DEFAULT_TOP_K)
            .await;
        assert!(!context.is_empty());
        assert!(context[0].text.contains("Machine learning"));
    }
}
