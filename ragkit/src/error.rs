//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while calling the generation backend.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The number of documents and embeddings passed to an indexing
    /// operation do not match.
    #[error("Count mismatch: {documents} documents but {embeddings} embeddings")]
    CountMismatch {
        /// Number of documents submitted for indexing.
        documents: usize,
        /// Number of embeddings submitted alongside them.
        embeddings: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An operation required an initialized pipeline.
    #[error("Pipeline not initialized")]
    NotInitialized,
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
