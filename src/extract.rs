//! Text extraction for uploaded documents (PDF, plain text).
//!
//! Extraction failures are per-document: a file that cannot be parsed or
//! decoded yields an empty string, which the pipeline filters out before
//! chunking. A bad file never aborts the batch it arrived in.

use crate::models::{ContentType, UploadedFile};

/// Extract plain UTF-8 text from an uploaded file.
///
/// PDF content is extracted with `pdf-extract`, which concatenates page text
/// and tolerates unrenderable content within a document. Plain text is
/// decoded as strict UTF-8. Any failure yields `""`.
pub fn extract_text(file: &UploadedFile) -> String {
    let text = match file.content_type {
        ContentType::Pdf => extract_pdf(&file.bytes, &file.name),
        ContentType::PlainText => extract_plain(&file.bytes, &file.name),
    };
    text.trim().to_string()
}

fn extract_pdf(bytes: &[u8], name: &str) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(file = name, error = %e, "PDF extraction failed, skipping file");
            String::new()
        }
    }
}

fn extract_plain(bytes: &[u8], name: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(file = name, error = %e, "not valid UTF-8, skipping file");
            String::new()
        }
    }
}
