//! # Askmydocs
//!
//! Ask natural-language questions over your own documents with
//! retrieval-augmented generation.
//!
//! Askmydocs ingests PDF and plain-text files, chunks and embeds them into
//! an in-memory vector index, retrieves the chunks nearest a question, and
//! asks a hosted language model to synthesize an answer grounded in them,
//! falling back to a deterministic local answer when the service is
//! unavailable.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────┐   ┌─────────────┐
//! │ Files     │──▶│ Extract  │──▶│  Chunk    │──▶│ VectorIndex │
//! │ pdf/txt  │   │         │   │  +Embed  │   │ (in memory) │
//! └──────────┘   └─────────┘   └──────────┘   └──────┬──────┘
//!                                                    │
//!                ┌──────────┐   ┌──────────┐         │
//! question ─────▶│ Retrieve │──▶│ Generate │◀────────┘
//!                └──────────┘   └──────────┘
//!                                    │
//!                                 answer
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Text extraction (PDF, plain text) |
//! | [`chunk`] | Overlapping-window text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | In-memory vector index |
//! | [`retrieve`] | Top-k context retrieval |
//! | [`generate`] | Answer synthesis with local fallback |
//! | [`engine`] | Pipeline orchestration |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod models;
pub mod retrieve;
