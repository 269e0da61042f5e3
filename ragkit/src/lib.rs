//! # ragkit
//!
//! A retrieval-augmented generation (RAG) pipeline: ingest documents,
//! index their embeddings, and answer questions grounded in the retrieved
//! passages.
//!
//! ## Overview
//!
//! - [`DataLoader`] / [`RecursiveSplitter`] — load text files and split
//!   them into embeddable pieces.
//! - [`EmbeddingProvider`] / [`HfEmbeddingProvider`] — turn text into
//!   fixed-dimension vectors.
//! - [`VectorStore`] / [`InMemoryVectorStore`] — index chunks and answer
//!   nearest-neighbor queries.
//! - [`Retriever`] — embed a query, search, apply the score threshold with
//!   a non-empty fallback, and assemble the grounded context.
//! - [`AnswerGenerator`] / [`GroqClient`] — produce a grounded answer or
//!   the [`NO_CONTEXT_ANSWER`] refusal.
//! - [`RagPipeline`] / [`PipelineContext`] — compose retrieval and
//!   generation, record query history, and serialize shared-state access.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{PipelineContext, RagConfig};
//!
//! let context = Arc::new(PipelineContext::new(RagConfig::from_env()?));
//! context.initialize().await?;
//! context.load_directory(std::path::Path::new("./data")).await?;
//!
//! let response = context.query("What does the manual say about X?", 5, 0.0).await?;
//! println!("{}", response.answer);
//! ```
//!
//! Queries never fail for lack of evidence: with zero retrieved documents
//! the pipeline answers with the fixed refusal string and skips the model
//! call entirely.

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod groq;
pub mod hf;
pub mod inmemory;
pub mod loader;
pub mod pipeline;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{RecursiveSplitter, TextSplitter};
pub use config::RagConfig;
pub use context::{PipelineComponents, PipelineContext, PipelineStatus};
pub use document::{Chunk, ChunkMetadata, Document, RetrievedChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generator::{AnswerGenerator, DEFAULT_SYSTEM_PROMPT, NO_CONTEXT_ANSWER};
pub use groq::GroqClient;
pub use hf::HfEmbeddingProvider;
pub use inmemory::InMemoryVectorStore;
pub use loader::DataLoader;
pub use pipeline::{QueryOptions, QueryResponse, RagPipeline, SourceInfo};
pub use retriever::{RetrievalOutcome, Retriever, SourceRef};
pub use vectorstore::{QueryBatch, VectorStore};
