//! Pipeline orchestration.
//!
//! [`RagEngine`] owns the only state that outlives a single call: the vector
//! index and the generation credential. The shell drives it through three
//! entry points: [`set_credential`](RagEngine::set_credential),
//! [`process_documents`](RagEngine::process_documents), and
//! [`ask_question`](RagEngine::ask_question).
//!
//! The engine is either Empty (no index yet) or Ready (index present).
//! Re-processing replaces the index all-or-nothing: any ingestion failure
//! leaves the previous index answering questions as before.

use crate::chunk::split_corpus;
use crate::config::Config;
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::error::PipelineError;
use crate::extract::extract_text;
use crate::generate::AnswerSynthesizer;
use crate::index::VectorIndex;
use crate::models::{IngestReport, UploadedFile};
use crate::retrieve::retrieve_context;

/// Answer returned when a question arrives before any successful ingestion.
pub const NO_INDEX_ANSWER: &str = "Please upload documents first";

pub struct RagEngine {
    config: Config,
    embedder: Box<dyn EmbeddingProvider>,
    synthesizer: AnswerSynthesizer,
    index: Option<VectorIndex>,
    credential: Option<String>,
}

impl RagEngine {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        crate::config::validate(&config)?;
        let embedder = create_provider(&config.embedding)?;
        let synthesizer = AnswerSynthesizer::new(&config.generation)?;
        Ok(Self {
            config,
            embedder,
            synthesizer,
            index: None,
            credential: None,
        })
    }

    /// Replace the generation credential. One slot per engine instance.
    pub fn set_credential(&mut self, token: impl Into<String>) {
        self.credential = Some(token.into());
    }

    /// Whether an index has been built.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Ingest a batch of files: extract, chunk, embed, and build the index.
    ///
    /// Extraction failures are per-file and silently drop the file; the
    /// batch fails only when nothing usable remains. On any error the
    /// existing index is untouched.
    pub async fn process_documents(
        &mut self,
        files: &[UploadedFile],
    ) -> Result<IngestReport, PipelineError> {
        let texts: Vec<(String, String)> = files
            .iter()
            .map(|f| (f.name.clone(), extract_text(f)))
            .filter(|(_, text)| !text.is_empty())
            .collect();

        if texts.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        let files_with_text = texts.len();

        let chunks = split_corpus(
            &texts,
            self.config.chunking.chunk_size,
            self.config.chunking.overlap,
        );
        if chunks.is_empty() {
            return Err(PipelineError::EmptyChunkSet);
        }
        let chunks_indexed = chunks.len();

        let index = VectorIndex::build(chunks, self.embedder.as_ref()).await?;
        self.index = Some(index);

        tracing::info!(
            files = files.len(),
            files_with_text,
            chunks = chunks_indexed,
            "index rebuilt"
        );

        Ok(IngestReport {
            files_received: files.len(),
            files_with_text,
            chunks_indexed,
        })
    }

    /// Answer a question from the indexed documents.
    ///
    /// Always returns a displayable string; expected operational states
    /// (no index, no credential, generation service down) surface as
    /// sentinel or degraded answers, never as errors.
    pub async fn ask_question(&self, question: &str) -> String {
        let index = match &self.index {
            Some(index) => index,
            None => return NO_INDEX_ANSWER.to_string(),
        };

        let context = match retrieve_context(
            question,
            index,
            self.embedder.as_ref(),
            self.config.retrieval.top_k,
            self.config.retrieval.context_budget,
        )
        .await
        {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, answering from empty context");
                String::new()
            }
        };

        self.synthesizer
            .synthesize(question, &context, self.credential.as_deref())
            .await
    }
}
