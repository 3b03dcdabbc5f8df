//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Supported upload formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Microsoft Word document (.docx)
    Docx,
}

impl FileType {
    /// Extensions accepted for upload
    pub const ALLOWED_EXTENSIONS: [&'static str; 3] = ["pdf", "txt", "docx"];

    /// Detect file type from extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Detect file type from a filename, failing with `UnsupportedFormat`
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        Self::from_extension(ext).ok_or_else(|| {
            let shown = if ext.is_empty() { "<none>" } else { ext };
            Error::UnsupportedFormat(format!(
                "'{}' (extension {}; allowed: {})",
                filename,
                shown,
                Self::ALLOWED_EXTENSIONS.join(", ")
            ))
        })
    }

    /// Format tag handed to the text extractor
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Docx => "docx",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Docx => "Word Document (.docx)",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional anchor of a chunk
///
/// Offsets run over the concatenation of prior chunk texts, so they drift from
/// the source bytes once whitespace has been normalised. Good enough for UI
/// display; not an exact mapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub start_char: usize,
    pub end_char: usize,
}

/// A chunk of text from a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// `{doc_id}_chunk_{index}`
    pub id: String,
    /// Text content
    pub text: String,
    /// Parent document ID
    pub doc_id: String,
    /// Chunk index within document (0-based, contiguous)
    pub chunk_index: usize,
    /// Positional anchor
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk with its deterministic ID
    pub fn new(doc_id: &str, chunk_index: usize, text: String, metadata: ChunkMetadata) -> Self {
        Self {
            id: Self::make_id(doc_id, chunk_index),
            text,
            doc_id: doc_id.to_string(),
            chunk_index,
            metadata,
        }
    }

    /// Chunk ID for a document and index
    pub fn make_id(doc_id: &str, chunk_index: usize) -> String {
        format!("{}_chunk_{}", doc_id, chunk_index)
    }
}

/// Registry entry for an uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Content-hash document ID
    pub doc_id: String,
    /// Original filename as uploaded
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// File size in bytes
    pub file_size: u64,
    /// Number of chunks stored
    pub chunk_count: usize,
    /// Generated summary, if one was produced
    #[serde(default)]
    pub summary: Option<String>,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl DocumentRecord {
    /// Create a registry entry stamped with the current time
    pub fn new(doc_id: String, filename: String, file_type: FileType, file_size: u64, chunk_count: usize) -> Self {
        Self {
            doc_id,
            filename,
            file_type,
            file_size,
            chunk_count,
            summary: None,
            uploaded_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_filename() {
        assert_eq!(FileType::from_filename("report.pdf").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_filename("Notes.TXT").unwrap(), FileType::Txt);
        assert_eq!(FileType::from_filename("a.b.docx").unwrap(), FileType::Docx);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["photo.jpg", "legacy.doc", "README", "archive.pdf.zip"] {
            let err = FileType::from_filename(name).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat(_)), "{}", name);
        }
    }

    #[test]
    fn test_chunk_id_format() {
        let chunk = Chunk::new("abc123", 7, "Hello.".into(), ChunkMetadata { start_char: 0, end_char: 7 });
        assert_eq!(chunk.id, "abc123_chunk_7");
        assert_eq!(chunk.doc_id, "abc123");
    }
}
