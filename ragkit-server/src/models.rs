//! Request and response models for the HTTP endpoints.

use serde::{Deserialize, Serialize};

use ragkit::QueryResponse;

fn default_top_k() -> usize {
    5
}

/// Request body for `POST /query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The question to answer; must be non-empty after trimming.
    pub question: String,
    /// Number of documents to retrieve.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum similarity score. Defaults to 0.0 so results are rarely
    /// dropped; the retriever falls back to unfiltered results when a
    /// positive threshold would drop everything.
    #[serde(default)]
    pub min_score: f32,
}

/// Request body for `POST /init`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeRequest {
    /// Embedding model override; the configured default when omitted.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Chat model override; the configured default when omitted.
    #[serde(default)]
    pub llm_model: Option<String>,
}

/// Request body for `POST /load-documents`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataLoadRequest {
    /// Directory to load documents from.
    pub data_directory: String,
}

/// Generic status/message response.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Outcome label (`"success"`, `"loading"`, ...).
    pub status: String,
    /// Human-readable detail.
    pub message: String,
}

/// Response body for `GET /history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// Recorded query responses, oldest first.
    pub history: Vec<QueryResponse>,
    /// Number of recorded entries.
    pub count: usize,
}
