//! Text extraction for pdf, txt and docx uploads

use crate::error::{Error, Result};
use crate::types::FileType;

/// Maps raw file bytes of a declared format to plain text
///
/// Failures are reported as `Error::Extraction` and are not retried.
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from `data`
    fn extract(&self, data: &[u8], file_type: FileType) -> Result<String>;
}

/// Default extractor backed by `pdf-extract` and `docx-rs`
#[derive(Debug, Default, Clone, Copy)]
pub struct FileParser;

impl FileParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse PDF document
    fn parse_pdf(data: &[u8]) -> Result<String> {
        let content = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extraction("document.pdf", e.to_string()))?;

        // Drop blank lines between pages, keep one newline per text line
        let text = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text.trim().to_string())
    }

    /// Parse plain text file
    fn parse_text(data: &[u8]) -> Result<String> {
        let content = std::str::from_utf8(data)
            .map_err(|e| Error::extraction("document.txt", format!("not valid UTF-8: {}", e)))?;

        Ok(content.trim_start_matches('\u{feff}').trim().to_string())
    }

    /// Parse DOCX document, one line per non-empty paragraph
    fn parse_docx(data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extraction("document.docx", e.to_string()))?;

        let mut paragraphs = Vec::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
        }

        Ok(paragraphs.join("\n"))
    }
}

impl TextExtractor for FileParser {
    fn extract(&self, data: &[u8], file_type: FileType) -> Result<String> {
        match file_type {
            FileType::Pdf => Self::parse_pdf(data),
            FileType::Txt => Self::parse_text(data),
            FileType::Docx => Self::parse_docx(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_txt() {
        let text = FileParser
            .extract(
                b"This is a test document.\nIt contains multiple lines.\nFor testing purposes.\n",
                FileType::Txt,
            )
            .unwrap();
        assert!(text.starts_with("This is a test document"));
        assert!(text.contains("multiple lines"));
        assert!(text.ends_with("purposes."));
    }

    #[test]
    fn test_extract_txt_strips_bom() {
        let text = FileParser.extract("\u{feff}Hello.".as_bytes(), FileType::Txt).unwrap();
        assert_eq!(text, "Hello.");
    }

    #[test]
    fn test_invalid_utf8_is_extraction_error() {
        let err = FileParser.extract(&[0xff, 0xfe, 0x00, 0x41], FileType::Txt).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_garbage_pdf_is_extraction_error() {
        let err = FileParser.extract(b"definitely not a pdf", FileType::Pdf).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_garbage_docx_is_extraction_error() {
        let err = FileParser.extract(b"PK but not really a zip", FileType::Docx).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
