//! Context retrieval for a question.
//!
//! Embeds the question with the same provider used at index-build time,
//! takes the top-k chunks, and joins their texts nearest-first into a single
//! context string bounded by a character budget.

use crate::embedding::EmbeddingProvider;
use crate::error::PipelineError;
use crate::index::VectorIndex;

/// Retrieve the concatenated top-k chunk texts for `question`.
///
/// Deterministic for a fixed index and provider. The result is truncated to
/// `budget` characters on a char boundary.
pub async fn retrieve_context(
    question: &str,
    index: &VectorIndex,
    embedder: &dyn EmbeddingProvider,
    top_k: usize,
    budget: usize,
) -> Result<String, PipelineError> {
    let query_vec = embedder.embed(question).await?;
    let hits = index.search(&query_vec, top_k);

    let joined = hits
        .iter()
        .map(|(chunk, _)| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(truncate_chars(&joined, budget))
}

/// Truncate to at most `budget` characters without splitting a char.
fn truncate_chars(s: &str, budget: usize) -> String {
    match s.char_indices().nth(budget) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::split_corpus;
    use crate::embedding::LocalHashEmbedder;

    async fn fixture(texts: &[&str]) -> (VectorIndex, LocalHashEmbedder) {
        let embedder = LocalHashEmbedder::new(128);
        let corpus: Vec<(String, String)> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| (format!("doc{}.txt", i), t.to_string()))
            .collect();
        let chunks = split_corpus(&corpus, 500, 50);
        let index = VectorIndex::build(chunks, &embedder).await.unwrap();
        (index, embedder)
    }

    #[tokio::test]
    async fn retrieval_is_deterministic() {
        let (index, embedder) = fixture(&[
            "The sky is blue. Grass is green.",
            "Oceans are deep and salty.",
        ])
        .await;
        let a = retrieve_context("What color is the sky?", &index, &embedder, 2, 800)
            .await
            .unwrap();
        let b = retrieve_context("What color is the sky?", &index, &embedder, 2, 800)
            .await
            .unwrap();
        assert_eq!(a, b);
        assert!(a.contains("sky"));
    }

    #[tokio::test]
    async fn context_respects_budget() {
        let long = "alpha beta gamma delta epsilon. ".repeat(100);
        let (index, embedder) = fixture(&[&long]).await;
        let context = retrieve_context("alpha", &index, &embedder, 5, 120)
            .await
            .unwrap();
        assert!(context.chars().count() <= 120);
        assert!(!context.is_empty());
    }

    #[tokio::test]
    async fn top_k_limits_retrieved_chunks() {
        let (index, embedder) = fixture(&[
            "Cats purr when content.",
            "Dogs bark at strangers.",
            "Birds sing at dawn.",
        ])
        .await;
        let context = retrieve_context("cats purr", &index, &embedder, 1, 800)
            .await
            .unwrap();
        assert!(context.contains("purr"));
        assert!(!context.contains('\n'));
    }

    #[test]
    fn truncate_snaps_to_char_boundary() {
        let s = "naïve café";
        let t = truncate_chars(s, 4);
        assert_eq!(t, "naïv");
    }
}
