//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Embedding model identifier passed to the embedding gateway.
    pub embedding_model: String,
    /// Chat model identifier passed to the generation backend.
    pub llm_model: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of top results to retrieve per query.
    pub top_k: usize,
    /// Default minimum similarity score. `0.0` disables filtering; the
    /// retriever falls back to unfiltered results when a positive
    /// threshold would drop everything.
    pub min_score: f32,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
    /// Maximum tokens in a generated answer.
    pub max_tokens: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            llm_model: "llama-3.1-8b-instant".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            min_score: 0.0,
            temperature: 0.1,
            max_tokens: 256,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a configuration from environment variables.
    ///
    /// Recognized variables: `EMBEDDING_MODEL`, `GROQ_LLM_MODEL`,
    /// `CHUNK_SIZE`, `CHUNK_OVERLAP`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a numeric variable fails to
    /// parse or the resulting configuration is inconsistent.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Ok(model) = std::env::var("GROQ_LLM_MODEL") {
            builder = builder.llm_model(model);
        }
        if let Ok(size) = std::env::var("CHUNK_SIZE") {
            let size = size.parse().map_err(|_| {
                RagError::ConfigError(format!("CHUNK_SIZE is not a valid integer: {size}"))
            })?;
            builder = builder.chunk_size(size);
        }
        if let Ok(overlap) = std::env::var("CHUNK_OVERLAP") {
            let overlap = overlap.parse().map_err(|_| {
                RagError::ConfigError(format!("CHUNK_OVERLAP is not a valid integer: {overlap}"))
            })?;
            builder = builder.chunk_overlap(overlap);
        }

        builder.build()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the chat model identifier.
    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm_model = model.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of top results to retrieve per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the default minimum similarity score for retrieval.
    pub fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Set the sampling temperature for answer generation.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum tokens in a generated answer.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
