//! Hugging Face embedding provider using the Inference API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Base URL of the Hugging Face feature-extraction pipeline.
const HF_FEATURE_EXTRACTION_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// The default sentence-embedding model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// The dimensionality of `all-MiniLM-L6-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by the Hugging Face Inference API.
///
/// Uses `reqwest` to call the feature-extraction pipeline of a
/// sentence-embedding model.
///
/// # Configuration
///
/// - `model` – defaults to `sentence-transformers/all-MiniLM-L6-v2`.
/// - `api_token` – from the constructor or the `HF_API_TOKEN` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::hf::HfEmbeddingProvider;
///
/// let provider = HfEmbeddingProvider::new("hf_...")?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
pub struct HfEmbeddingProvider {
    client: reqwest::Client,
    api_token: String,
    model: String,
    dimensions: usize,
}

impl HfEmbeddingProvider {
    /// Create a new provider with the given API token.
    ///
    /// Uses the default model (`sentence-transformers/all-MiniLM-L6-v2`,
    /// 384 dimensions).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the token is empty.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(RagError::ConfigError(
                "Hugging Face API token must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_token,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `HF_API_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("HF_API_TOKEN").map_err(|_| {
            RagError::ConfigError("HF_API_TOKEN environment variable not set".to_string())
        })?;
        Self::new(api_token)
    }

    /// Set the model name (e.g. `sentence-transformers/all-mpnet-base-v2`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding dimensionality reported by this provider.
    ///
    /// Use when overriding the model with one of a different output size.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── Inference API request/response types ───────────────────────────

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for HfEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "HuggingFace", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: "HuggingFace".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "HuggingFace",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let url = format!("{HF_FEATURE_EXTRACTION_URL}/{}", self.model);
        let request_body = FeatureExtractionRequest {
            inputs: texts.to_vec(),
            options: RequestOptions { wait_for_model: true },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "HuggingFace", error = %e, "request failed");
                RagError::EmbeddingError {
                    provider: "HuggingFace".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = "HuggingFace", %status, "API error");
            return Err(RagError::EmbeddingError {
                provider: "HuggingFace".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            error!(provider = "HuggingFace", error = %e, "failed to parse response");
            RagError::EmbeddingError {
                provider: "HuggingFace".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        if embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "HuggingFace".into(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
