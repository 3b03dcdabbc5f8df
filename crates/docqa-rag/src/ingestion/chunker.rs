//! Sentence-atomic text chunking

use crate::types::{Chunk, ChunkMetadata};

/// Delimiter between sentence units
const SENTENCE_DELIMITER: &str = ". ";

/// Greedy sentence chunker with an upper bound on chunk length
///
/// Newlines are folded to spaces and the text is split on `". "`. Sentence units
/// are appended to a running buffer while the buffer stays under the bound; a unit
/// that would reach it closes the buffer and starts the next one. Units are never
/// split, so a single sentence longer than the bound becomes its own oversized chunk.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Upper bound on chunk length in characters
    max_chunk_chars: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(max_chunk_chars: usize) -> Self {
        Self { max_chunk_chars }
    }

    /// Configured bound
    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    /// Chunk extracted text for a document
    pub fn chunk(&self, text: &str, doc_id: &str) -> Vec<Chunk> {
        let normalized: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        let units: Vec<&str> = normalized.split(SENTENCE_DELIMITER).collect();
        let last = units.len().saturating_sub(1);

        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;
        let mut emitted_chars = 0usize;

        for (i, unit) in units.iter().enumerate() {
            let unit_chars = unit.chars().count();
            // The split consumed a delimiter after every unit but the last
            let delimiter = if i < last { SENTENCE_DELIMITER } else { "" };

            if buffer_chars + unit_chars >= self.max_chunk_chars {
                if let Some(chunk) = self.close(&buffer, buffer_chars, doc_id, chunks.len(), emitted_chars) {
                    emitted_chars += chunk.text.chars().count();
                    chunks.push(chunk);
                }
                buffer.clear();
                buffer_chars = 0;
            }

            buffer.push_str(unit);
            buffer.push_str(delimiter);
            buffer_chars += unit_chars + delimiter.len();
        }

        if let Some(chunk) = self.close(&buffer, buffer_chars, doc_id, chunks.len(), emitted_chars) {
            chunks.push(chunk);
        }

        tracing::debug!(
            "Chunked document {} into {} chunks (max {} chars)",
            doc_id,
            chunks.len(),
            self.max_chunk_chars
        );

        chunks
    }

    /// Turn a buffer into a chunk, skipping whitespace-only buffers
    fn close(
        &self,
        buffer: &str,
        buffer_chars: usize,
        doc_id: &str,
        chunk_index: usize,
        start_char: usize,
    ) -> Option<Chunk> {
        let text = buffer.trim();
        if text.is_empty() {
            return None;
        }

        Some(Chunk::new(
            doc_id,
            chunk_index,
            text.to_string(),
            ChunkMetadata {
                start_char,
                end_char: start_char + buffer_chars,
            },
        ))
    }
}

/// Chunk `text` for `doc_id` with the given bound
pub fn chunk(text: &str, doc_id: &str, max_chunk_chars: usize) -> Vec<Chunk> {
    TextChunker::new(max_chunk_chars).chunk(text, doc_id)
}
