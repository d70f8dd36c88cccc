//! Overlapping-window text chunker.
//!
//! Splits extracted document text into windows of at most `chunk_size` bytes
//! that advance by `chunk_size - overlap`, so adjacent chunks from the same
//! document share `overlap` bytes of text and context is not lost at split
//! boundaries. Window ends prefer a paragraph, sentence, or word boundary
//! over a mid-word cut when one exists past the middle of the window.
//!
//! Chunk text is the exact substring of the input: rejoining a document's
//! chunks minus the overlap reconstructs the input, and re-splitting the
//! reconstruction reproduces the same boundaries.
//!
//! Each chunk receives a UUID plus a SHA-256 hash of its text.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

/// Split one document's text into overlapping chunks.
///
/// Returns chunks with contiguous indices starting at 0. Empty input
/// produces zero chunks.
pub fn split_text(source: &str, text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut chunk_index: i64 = 0;
    let mut start = 0usize;

    while start < text.len() {
        let hard_end = snap_to_char_boundary(text, (start + chunk_size).min(text.len()));
        let end = if hard_end < text.len() {
            natural_break(text, start, hard_end).unwrap_or(hard_end)
        } else {
            hard_end
        };
        // A pathological window (no char boundary past start) must still advance.
        let end = if end <= start {
            next_char_boundary(text, start + 1)
        } else {
            end
        };

        chunks.push(make_chunk(source, chunk_index, &text[start..end]));
        chunk_index += 1;

        if end >= text.len() {
            break;
        }

        let next = snap_to_char_boundary(text, end.saturating_sub(overlap));
        start = if next <= start { end } else { next };
    }

    chunks
}

/// Split a batch of (source, text) pairs, concatenating the per-document
/// chunk lists in input order.
pub fn split_corpus(texts: &[(String, String)], chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let mut all = Vec::new();
    for (source, text) in texts {
        all.extend(split_text(source, text, chunk_size, overlap));
    }
    all
}

/// Find the best natural breakpoint in `text[start..hard_end]`.
///
/// Prefers a paragraph break, then a sentence end, then a word gap, but only
/// past the midpoint of the window so chunks stay near their target size.
fn natural_break(text: &str, start: usize, hard_end: usize) -> Option<usize> {
    let window = &text[start..hard_end];
    let min_len = window.len() / 2;

    let candidate = window
        .rfind("\n\n")
        .map(|pos| pos + 2)
        .filter(|&pos| pos > min_len)
        .or_else(|| {
            window
                .rfind(". ")
                .map(|pos| pos + 2)
                .filter(|&pos| pos > min_len)
        })
        .or_else(|| {
            window
                .rfind(' ')
                .map(|pos| pos + 1)
                .filter(|&pos| pos > min_len)
        })?;

    Some(start + candidate)
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary.
fn snap_to_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Snap a byte index forward to the next valid UTF-8 char boundary.
fn next_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i.min(s.len())
}

/// Create a single [`Chunk`] with a UUID and SHA-256 content hash.
fn make_chunk(source: &str, index: i64, text: &str) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source: source.to_string(),
        chunk_index: index,
        text: text.to_string(),
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(split_text("doc1", "", 500, 50).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = split_text("doc1", "Hello, world!", 500, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello, world!");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].source, "doc1");
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let text = "word ".repeat(400);
        for chunk in split_text("doc1", &text, 100, 20) {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.len() <= 100, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn adjacent_chunks_share_overlap() {
        let text = "abcdefghij".repeat(30);
        let chunks = split_text("doc1", &text, 100, 20);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let left = &pair[0].text;
            let right = &pair[1].text;
            assert_eq!(&left[left.len() - 20..], &right[..20]);
        }
    }

    #[test]
    fn indices_are_contiguous() {
        let text = "Sentence number one. ".repeat(60);
        let chunks = split_text("doc1", &text, 120, 30);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64);
        }
    }

    #[test]
    fn sentence_boundary_is_preferred_over_mid_word_cut() {
        let text = format!("{}. {}", "a".repeat(80), "b".repeat(80));
        let chunks = split_text("doc1", &text, 100, 10);
        assert!(chunks[0].text.ends_with(". "), "got {:?}", &chunks[0].text);
    }

    #[test]
    fn resplitting_reconstruction_reproduces_boundaries() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let overlap = 30;
        let chunks = split_text("doc1", &text, 150, overlap);
        assert!(chunks.len() > 1);

        // Rejoin without the shared overlap, then split again.
        let mut rejoined = chunks[0].text.clone();
        for c in &chunks[1..] {
            rejoined.push_str(&c.text[overlap..]);
        }
        assert_eq!(rejoined, text);

        let again = split_text("doc1", &rejoined, 150, overlap);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let texts_again: Vec<&str> = again.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, texts_again);
    }

    #[test]
    fn multibyte_utf8_chars_do_not_panic() {
        let text = "┌──────────────────┐ naïve café résumé ".repeat(20);
        let chunks = split_text("doc1", &text, 50, 10);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(!c.text.is_empty());
        }
    }

    #[test]
    fn corpus_split_concatenates_per_document_chunks() {
        let texts = vec![
            ("a.txt".to_string(), "Alpha document text.".to_string()),
            ("b.txt".to_string(), String::new()),
            ("c.txt".to_string(), "Gamma document text.".to_string()),
        ];
        let chunks = split_corpus(&texts, 500, 50);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, "a.txt");
        assert_eq!(chunks[1].source, "c.txt");
    }

    #[test]
    fn deterministic() {
        let text = "Alpha beta gamma delta. ".repeat(30);
        let c1 = split_text("doc1", &text, 100, 25);
        let c2 = split_text("doc1", &text, 100, 25);
        assert_eq!(c1.len(), c2.len());
        for (a, b) in c1.iter().zip(c2.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.hash, b.hash);
            assert_eq!(a.chunk_index, b.chunk_index);
        }
    }
}
