//! Error types for the ingestion pipeline.
//!
//! Only failures that abort ingestion live here. Expected operational states
//! while answering (no documents yet, no credential, generation service down)
//! are not errors; they surface as sentinel answer strings instead.

use thiserror::Error;

/// Failures that abort a `process_documents` call.
///
/// The index is left untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No uploaded file yielded any text.
    #[error("No valid text found in uploaded files")]
    EmptyCorpus,

    /// Extraction produced text but chunking produced nothing.
    #[error("Text chunks are empty after splitting")]
    EmptyChunkSet,

    /// The embedding provider failed.
    #[error("Embedding generation failed: {0}")]
    Embedding(String),
}

impl PipelineError {
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }
}
