//! The retrieval-and-answer pipeline.
//!
//! [`RagPipeline`] composes a [`Retriever`] and an [`AnswerGenerator`] and
//! enforces the grounding invariant: when retrieval produces zero
//! documents, the generator is never invoked and the refusal answer is
//! returned directly. Every query is appended to an in-memory history that
//! lives for the life of the process.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generator::{AnswerGenerator, NO_CONTEXT_ANSWER};
use crate::retriever::Retriever;

/// Number of characters shown in a source preview before truncation.
const PREVIEW_CHARS: usize = 200;

/// Per-query knobs. The defaults match the query endpoint's defaults.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// Number of documents to retrieve.
    pub top_k: usize,
    /// Minimum similarity score; `0.0` disables filtering.
    pub min_score: f32,
    /// Whether to attach per-document source summaries.
    pub return_sources: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { top_k: 5, min_score: 0.0, return_sources: true }
    }
}

/// Source summary attached to a query response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source file name, `"unknown"` when absent.
    pub source: String,
    /// Page label, `"N/A"` when absent.
    pub page: String,
    /// Similarity score of the supporting chunk.
    pub similarity_score: f32,
    /// First 200 characters of the chunk text, `"..."`-suffixed when
    /// truncated.
    pub preview: String,
}

/// The full response to one pipeline query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The question as asked.
    pub question: String,
    /// The generated (or refusal) answer.
    pub answer: String,
    /// Number of supporting documents retrieved.
    pub document_count: usize,
    /// Highest similarity score among the documents, `0.0` with none.
    pub confidence: f32,
    /// Source summaries, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceInfo>>,
}

/// Composes retrieval and generation, and records query history.
pub struct RagPipeline {
    retriever: Retriever,
    generator: Arc<dyn AnswerGenerator>,
    history: Vec<QueryResponse>,
}

impl RagPipeline {
    /// Create a pipeline over the given retriever and generator.
    pub fn new(retriever: Retriever, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { retriever, generator, history: Vec::new() }
    }

    /// Execute a complete query: retrieve, generate, record.
    ///
    /// With zero retrieved documents the answer is [`NO_CONTEXT_ANSWER`]
    /// and the generator is not called — the pipeline cannot answer
    /// without supporting evidence, regardless of what the generator would
    /// do with an empty context.
    pub async fn query(&mut self, question: &str, options: QueryOptions) -> QueryResponse {
        let outcome = self
            .retriever
            .retrieve_with_context(question, options.top_k, options.min_score)
            .await;

        let answer = if outcome.documents.is_empty() {
            NO_CONTEXT_ANSWER.to_string()
        } else {
            self.generator.generate(question, &outcome.context).await
        };

        let confidence = outcome
            .documents
            .iter()
            .map(|d| d.similarity_score)
            .reduce(f32::max)
            .unwrap_or(0.0);

        let sources = options.return_sources.then(|| {
            outcome
                .documents
                .iter()
                .map(|d| SourceInfo {
                    source: d.metadata.source_label().to_string(),
                    page: d.metadata.page_label(),
                    similarity_score: d.similarity_score,
                    preview: preview(&d.text),
                })
                .collect()
        });

        let response = QueryResponse {
            question: question.to_string(),
            answer,
            document_count: outcome.document_count,
            confidence,
            sources,
        };

        info!(
            document_count = response.document_count,
            confidence = response.confidence,
            "query answered"
        );

        self.history.push(response.clone());
        response
    }

    /// Query history, oldest first.
    pub fn history(&self) -> &[QueryResponse] {
        &self.history
    }

    /// Empty the query history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, `"..."`-suffixed when the
/// text is longer.
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::document::{ChunkMetadata, Document};
    use crate::embedding::EmbeddingProvider;
    use crate::error::Result;
    use crate::inmemory::InMemoryVectorStore;
    use crate::vectorstore::VectorStore;

    /// Generator that records how often it was invoked.
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl CountingGenerator {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0) })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerGenerator for CountingGenerator {
        async fn generate(&self, question: &str, _context: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("answer to: {question}")
        }

        fn model_name(&self) -> &str {
            "counting-mock"
        }
    }

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    async fn pipeline_with_documents(texts: &[&str]) -> (RagPipeline, Arc<CountingGenerator>) {
        let store = Arc::new(InMemoryVectorStore::new());
        if !texts.is_empty() {
            let documents: Vec<Document> = texts
                .iter()
                .map(|t| Document::new(*t, ChunkMetadata::default()))
                .collect();
            let embeddings = vec![vec![1.0, 0.0]; texts.len()];
            store.add_documents(&documents, &embeddings).await.unwrap();
        }

        let retriever = Retriever::new(store, Arc::new(UnitEmbedder));
        let generator = CountingGenerator::new();
        (RagPipeline::new(retriever, generator.clone()), generator)
    }

    #[tokio::test]
    async fn empty_index_refuses_without_calling_the_generator() {
        let (mut pipeline, generator) = pipeline_with_documents(&[]).await;

        let response = pipeline.query("anything?", QueryOptions::default()).await;

        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert_eq!(response.document_count, 0);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn documents_present_delegates_to_the_generator() {
        let (mut pipeline, generator) = pipeline_with_documents(&["relevant text"]).await;

        let response = pipeline.query("what is relevant?", QueryOptions::default()).await;

        assert_eq!(response.answer, "answer to: what is relevant?");
        assert_eq!(response.document_count, 1);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn confidence_is_the_maximum_similarity() {
        let (mut pipeline, _) = pipeline_with_documents(&["a", "b"]).await;

        let response = pipeline.query("q", QueryOptions::default()).await;

        // Identical unit embeddings: every match scores ~1.0
        assert!((response.confidence - 1.0).abs() < 1e-5);
        assert_eq!(response.document_count, 2);
    }

    #[tokio::test]
    async fn sources_can_be_omitted() {
        let (mut pipeline, _) = pipeline_with_documents(&["a"]).await;

        let options = QueryOptions { return_sources: false, ..Default::default() };
        let response = pipeline.query("q", options).await;

        assert!(response.sources.is_none());
    }

    #[tokio::test]
    async fn long_text_previews_are_truncated_with_ellipsis() {
        let long = "x".repeat(250);
        let (mut pipeline, _) = pipeline_with_documents(&[long.as_str()]).await;

        let response = pipeline.query("q", QueryOptions::default()).await;

        let sources = response.sources.unwrap();
        let preview = &sources[0].preview;
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
    }

    #[tokio::test]
    async fn short_text_previews_are_untouched() {
        let short = "y".repeat(150);
        let (mut pipeline, _) = pipeline_with_documents(&[short.as_str()]).await;

        let response = pipeline.query("q", QueryOptions::default()).await;

        let sources = response.sources.unwrap();
        assert_eq!(sources[0].preview, short);
    }

    #[tokio::test]
    async fn history_records_queries_oldest_first() {
        let (mut pipeline, _) = pipeline_with_documents(&["doc"]).await;

        pipeline.query("first?", QueryOptions::default()).await;
        pipeline.query("second?", QueryOptions::default()).await;

        let history = pipeline.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "first?");
        assert_eq!(history[1].question, "second?");
    }

    #[tokio::test]
    async fn clear_history_then_history_is_empty() {
        let (mut pipeline, _) = pipeline_with_documents(&["doc"]).await;
        pipeline.query("q", QueryOptions::default()).await;

        pipeline.clear_history();
        assert!(pipeline.history().is_empty());

        // Clearing an already-empty history stays empty
        pipeline.clear_history();
        assert!(pipeline.history().is_empty());
    }
}
