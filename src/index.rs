//! In-memory vector index over document chunks.
//!
//! Stores one `(vector, chunk)` pair per chunk and answers nearest-neighbor
//! queries by brute-force cosine similarity, which is exact and plenty fast
//! at personal-corpus scale. An index is built whole from one processing
//! batch; replacing it is a single assignment in the engine, so a query sees
//! either the old complete index or the new one, never a partial build.

use crate::embedding::{cosine_similarity, EmbeddingProvider};
use crate::error::PipelineError;
use crate::models::Chunk;

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// A fully built, immutable vector index.
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dims: usize,
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// Fails without side effects if the embedding provider fails; the
    /// caller keeps whatever index it had.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, PipelineError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(PipelineError::embedding(format!(
                "provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self {
            entries,
            dims: embedder.dims(),
        })
    }

    /// Return the `k` chunks nearest to `query_vec`, best first.
    ///
    /// `k` is capped at the number of stored chunks; an empty index returns
    /// an empty list. The sort is stable, so equal scores keep insertion
    /// order and retrieval stays deterministic.
    pub fn search(&self, query_vec: &[f32], k: usize) -> Vec<(&Chunk, f32)> {
        let mut scored: Vec<(&Chunk, f32)> = self
            .entries
            .iter()
            .map(|e| (&e.chunk, cosine_similarity(query_vec, &e.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::split_text;
    use crate::embedding::LocalHashEmbedder;

    async fn build_index(texts: &[&str]) -> (VectorIndex, LocalHashEmbedder) {
        let embedder = LocalHashEmbedder::new(128);
        let mut chunks = Vec::new();
        for (i, t) in texts.iter().enumerate() {
            chunks.extend(split_text(&format!("doc{}", i), t, 500, 50));
        }
        let index = VectorIndex::build(chunks, &embedder).await.unwrap();
        (index, embedder)
    }

    #[tokio::test]
    async fn empty_index_returns_no_results() {
        let (index, embedder) = build_index(&[]).await;
        let q = embedder.embed("anything").await.unwrap();
        assert!(index.is_empty());
        assert!(index.search(&q, 5).is_empty());
    }

    #[tokio::test]
    async fn k_is_capped_at_index_size() {
        let (index, embedder) = build_index(&["one fish", "two fish"]).await;
        let q = embedder.embed("fish").await.unwrap();
        let results = index.search(&q, 10);
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn nearest_chunk_comes_first() {
        let (index, embedder) = build_index(&[
            "The sky is blue and wide.",
            "Bread needs flour and yeast.",
        ])
        .await;
        let q = embedder.embed("what color is the sky").await.unwrap();
        let results = index.search(&q, 2);
        assert!(results[0].0.text.contains("sky"));
        assert!(results[0].1 >= results[1].1);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let (index, _) = build_index(&["alpha beta", "alpha beta"]).await;
        // A zero query vector scores every chunk 0.0.
        let results = index.search(&vec![0.0; 128], 2);
        assert_eq!(results[0].0.source, "doc0");
        assert_eq!(results[1].0.source, "doc1");
    }

    #[tokio::test]
    async fn search_is_deterministic() {
        let (index, embedder) = build_index(&[
            "Rust has ownership and borrowing.",
            "Gardens need water and sunlight.",
            "Compilers turn source into machine code.",
        ])
        .await;
        let q = embedder.embed("programming languages").await.unwrap();
        let a: Vec<String> = index.search(&q, 3).iter().map(|(c, _)| c.id.clone()).collect();
        let b: Vec<String> = index.search(&q, 3).iter().map(|(c, _)| c.id.clone()).collect();
        assert_eq!(a, b);
    }
}
