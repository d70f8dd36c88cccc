//! Core data models used throughout the pipeline.
//!
//! These types represent the uploaded files, chunks, and chat turns that flow
//! through ingestion and answering.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Declared content type of an uploaded file.
///
/// Dispatch in the extractor is a plain tag switch on this enum; there is no
/// runtime probing of file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    PlainText,
}

impl ContentType {
    /// Map a MIME type to a content type, if supported.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Map a file extension (lowercase, no dot) to a content type, if supported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }
}

/// A file handed to the pipeline by the shell. Exists only during ingestion.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Display name, usually the file name. Carried into chunk metadata.
    pub name: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: ContentType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }
}

/// A bounded slice of one document's text, the unit of embedding and retrieval.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    /// Name of the file this chunk came from.
    pub source: String,
    pub chunk_index: i64,
    pub text: String,
    /// SHA-256 of the chunk text.
    pub hash: String,
}

/// One question/answer exchange, retained by the shell for display.
///
/// The core never mutates a turn after creating it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        }
    }
}

/// Counts reported by a successful ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Files the caller handed in.
    pub files_received: usize,
    /// Files that yielded non-empty text.
    pub files_with_text: usize,
    /// Chunks embedded into the index.
    pub chunks_indexed: usize,
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed {} files into {} chunks",
            self.files_received, self.chunks_indexed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_from_mime() {
        assert_eq!(ContentType::from_mime("application/pdf"), Some(ContentType::Pdf));
        assert_eq!(ContentType::from_mime("text/plain"), Some(ContentType::PlainText));
        assert_eq!(ContentType::from_mime("application/octet-stream"), None);
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(ContentType::from_extension("pdf"), Some(ContentType::Pdf));
        assert_eq!(ContentType::from_extension("txt"), Some(ContentType::PlainText));
        assert_eq!(ContentType::from_extension("docx"), None);
    }

    #[test]
    fn report_message_matches_reference_wording() {
        let report = IngestReport {
            files_received: 3,
            files_with_text: 2,
            chunks_indexed: 7,
        };
        assert_eq!(report.to_string(), "Processed 3 files into 7 chunks");
    }
}
