//! Pipeline lifecycle and shared-state ownership.
//!
//! [`PipelineContext`] owns every component of the RAG pipeline behind a
//! single `tokio::sync::Mutex`. Request handlers receive it by `Arc`
//! instead of reaching for globals. The lock is held for the full duration
//! of initialization, reset, document loading, and each query (embedding
//! through history append) — queries are serialized globally. The vector
//! index and the history list are not safe for concurrent mutation, so
//! this trades parallelism for correctness.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generator::AnswerGenerator;
use crate::groq::GroqClient;
use crate::hf::HfEmbeddingProvider;
use crate::inmemory::InMemoryVectorStore;
use crate::loader::DataLoader;
use crate::pipeline::{QueryOptions, QueryResponse, RagPipeline};
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The components a pipeline is assembled from.
///
/// Used to inject alternative backends (a different store, an offline
/// embedder, a mock generator) instead of the environment-configured
/// defaults.
pub struct PipelineComponents {
    /// The embedding gateway.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// The vector index.
    pub store: Arc<dyn VectorStore>,
    /// The answer generator.
    pub generator: Arc<dyn AnswerGenerator>,
}

/// A snapshot of the pipeline's state for health/status reporting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStatus {
    /// Whether the pipeline has been initialized.
    pub initialized: bool,
    /// Number of chunks currently indexed.
    pub documents_indexed: usize,
    /// The configured embedding model, when initialized.
    pub embedding_model: Option<String>,
    /// The configured chat model, when initialized.
    pub llm_model: Option<String>,
}

struct PipelineState {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    loader: DataLoader,
    pipeline: RagPipeline,
    embedding_model: String,
    llm_model: String,
}

/// Owns the pipeline components and serializes access to them.
pub struct PipelineContext {
    state: Mutex<Option<PipelineState>>,
    config: RagConfig,
}

impl PipelineContext {
    /// Create an uninitialized context with the given configuration.
    pub fn new(config: RagConfig) -> Self {
        Self { state: Mutex::new(None), config }
    }

    /// The configuration this context was created with.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Initialize the pipeline from environment-configured backends.
    ///
    /// Builds the Hugging Face embedding gateway, the in-memory vector
    /// store, and the Groq answer generator. Idempotent: an already
    /// initialized context is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] when required credentials
    /// (`HF_API_TOKEN`, `GROQ_API_KEY`) are missing — fatal here, not at
    /// query time.
    pub async fn initialize(&self) -> Result<()> {
        self.initialize_with_models(None, None).await
    }

    /// Initialize with optional model-name overrides.
    ///
    /// Idempotent like [`initialize`](Self::initialize); errors the same
    /// way.
    pub async fn initialize_with_models(
        &self,
        embedding_model: Option<String>,
        llm_model: Option<String>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_some() {
            info!("pipeline already initialized, skipping re-initialization");
            return Ok(());
        }

        let embedding_model = embedding_model.unwrap_or_else(|| self.config.embedding_model.clone());
        let llm_model = llm_model.unwrap_or_else(|| self.config.llm_model.clone());

        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(HfEmbeddingProvider::from_env()?.with_model(&embedding_model));
        let generator: Arc<dyn AnswerGenerator> = Arc::new(
            GroqClient::from_env()?
                .with_model(&llm_model)
                .with_temperature(self.config.temperature)
                .with_max_tokens(self.config.max_tokens),
        );
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());

        *state = Some(self.assemble(store, embedder, generator, embedding_model));
        info!("pipeline initialized");
        Ok(())
    }

    /// Initialize the pipeline from injected components.
    ///
    /// Replaces any existing state. The embedding model label comes from
    /// the configuration; the chat model label from the generator.
    pub async fn initialize_with(&self, components: PipelineComponents) -> Result<()> {
        let mut state = self.state.lock().await;

        let PipelineComponents { embedder, store, generator } = components;
        let embedding_model = self.config.embedding_model.clone();
        *state = Some(self.assemble(store, embedder, generator, embedding_model));
        info!("pipeline initialized from injected components");
        Ok(())
    }

    fn assemble(
        &self,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn AnswerGenerator>,
        embedding_model: String,
    ) -> PipelineState {
        let retriever = Retriever::new(store.clone(), embedder.clone());
        let llm_model = generator.model_name().to_string();
        let pipeline = RagPipeline::new(retriever, generator);
        let loader = DataLoader::new(self.config.chunk_size, self.config.chunk_overlap);

        PipelineState { store, embedder, loader, pipeline, embedding_model, llm_model }
    }

    /// Whether the pipeline has been initialized.
    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Execute one query end to end, holding the lock throughout.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] when the pipeline was never
    /// built. Retrieval and generation failures do not surface here — they
    /// collapse into an empty document set and an error-prefixed answer
    /// respectively.
    pub async fn query(
        &self,
        question: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<QueryResponse> {
        let mut state = self.state.lock().await;
        let state = state.as_mut().ok_or(RagError::NotInitialized)?;

        let options = QueryOptions { top_k, min_score, return_sources: true };
        Ok(state.pipeline.query(question, options).await)
    }

    /// Load, split, embed, and index every document under `data_directory`.
    ///
    /// Returns the number of chunks indexed. Holds the lock for the full
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] before initialization, or the
    /// embedding/store error that interrupted indexing.
    pub async fn load_directory(&self, data_directory: &Path) -> Result<usize> {
        let mut state = self.state.lock().await;
        let state = state.as_mut().ok_or(RagError::NotInitialized)?;

        info!(directory = %data_directory.display(), "loading documents");
        let documents = state.loader.load_documents(data_directory);
        if documents.is_empty() {
            return Ok(0);
        }

        let pieces = state.loader.split_documents(&documents);
        let texts: Vec<&str> = pieces.iter().map(|d| d.text.as_str()).collect();
        let embeddings = state.embedder.embed_batch(&texts).await?;
        let ids = state.store.add_documents(&pieces, &embeddings).await?;

        info!(chunk_count = ids.len(), "documents indexed");
        Ok(ids.len())
    }

    /// Query history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] before initialization.
    pub async fn history(&self) -> Result<Vec<QueryResponse>> {
        let state = self.state.lock().await;
        let state = state.as_ref().ok_or(RagError::NotInitialized)?;
        Ok(state.pipeline.history().to_vec())
    }

    /// Empty the query history.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] before initialization.
    pub async fn clear_history(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let state = state.as_mut().ok_or(RagError::NotInitialized)?;
        state.pipeline.clear_history();
        Ok(())
    }

    /// Number of chunks currently indexed (0 before initialization).
    pub async fn document_count(&self) -> usize {
        let state = self.state.lock().await;
        match state.as_ref() {
            Some(state) => state.store.count().await,
            None => 0,
        }
    }

    /// A snapshot of the pipeline's state.
    pub async fn status(&self) -> PipelineStatus {
        let state = self.state.lock().await;
        match state.as_ref() {
            Some(state) => PipelineStatus {
                initialized: true,
                documents_indexed: state.store.count().await,
                embedding_model: Some(state.embedding_model.clone()),
                llm_model: Some(state.llm_model.clone()),
            },
            None => PipelineStatus {
                initialized: false,
                documents_indexed: 0,
                embedding_model: None,
                llm_model: None,
            },
        }
    }

    /// Reset the pipeline: clear the index and the query history.
    ///
    /// The components themselves are kept; only their state is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotInitialized`] before initialization, or the
    /// store error that prevented clearing.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let state = state.as_mut().ok_or(RagError::NotInitialized)?;

        state.store.clear().await?;
        state.pipeline.clear_history();
        info!("pipeline reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::document::{ChunkMetadata, Document};
    use crate::generator::NO_CONTEXT_ANSWER;

    /// Deterministic hash-based embeddings — no model, no network.
    struct HashEmbedder {
        dimensions: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let hash =
                text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let mut embedding = vec![0.0f32; self.dimensions];
            for (i, v) in embedding.iter_mut().enumerate() {
                *v = ((hash.wrapping_add(i as u64)) as f32).sin();
            }
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                embedding.iter_mut().for_each(|x| *x /= norm);
            }
            Ok(embedding)
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl AnswerGenerator for EchoGenerator {
        async fn generate(&self, question: &str, _context: &str) -> String {
            format!("echo: {question}")
        }

        fn model_name(&self) -> &str {
            "echo-mock"
        }
    }

    async fn initialized_context() -> Arc<PipelineContext> {
        let context = Arc::new(PipelineContext::new(RagConfig::default()));
        context
            .initialize_with(PipelineComponents {
                embedder: Arc::new(HashEmbedder { dimensions: 16 }),
                store: Arc::new(InMemoryVectorStore::new()),
                generator: Arc::new(EchoGenerator),
            })
            .await
            .unwrap();
        context
    }

    async fn index_texts(context: &PipelineContext, texts: &[&str]) {
        let mut state = context.state.lock().await;
        let state = state.as_mut().unwrap();
        let documents: Vec<Document> =
            texts.iter().map(|t| Document::new(*t, ChunkMetadata::default())).collect();
        let mut embeddings = Vec::new();
        for text in texts {
            embeddings.push(state.embedder.embed(text).await.unwrap());
        }
        state.store.add_documents(&documents, &embeddings).await.unwrap();
    }

    #[tokio::test]
    async fn query_before_initialization_fails() {
        let context = PipelineContext::new(RagConfig::default());
        let result = context.query("q", 5, 0.0).await;
        assert!(matches!(result, Err(RagError::NotInitialized)));
    }

    #[tokio::test]
    async fn query_on_empty_index_refuses() {
        let context = initialized_context().await;
        let response = context.query("anything?", 5, 0.0).await.unwrap();

        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert_eq!(response.document_count, 0);
        assert_eq!(response.confidence, 0.0);
    }

    #[tokio::test]
    async fn query_with_documents_answers_and_records_history() {
        let context = initialized_context().await;
        index_texts(&context, &["tokio is an async runtime"]).await;

        let response = context.query("what is tokio?", 5, 0.0).await.unwrap();
        assert_eq!(response.answer, "echo: what is tokio?");
        assert_eq!(response.document_count, 1);

        let history = context.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "what is tokio?");
    }

    #[tokio::test]
    async fn concurrent_queries_keep_history_consistent() {
        let context = initialized_context().await;
        index_texts(&context, &["alpha doc", "beta doc"]).await;

        let (a, b) = tokio::join!(
            context.query("first question?", 5, 0.0),
            context.query("second question?", 5, 0.0),
        );
        a.unwrap();
        b.unwrap();

        let history = context.history().await.unwrap();
        assert_eq!(history.len(), 2);
        for entry in &history {
            assert_eq!(
                entry.document_count,
                entry.sources.as_ref().map(Vec::len).unwrap_or_default()
            );
            assert!(!entry.answer.is_empty());
        }
    }

    #[tokio::test]
    async fn clear_history_is_idempotent() {
        let context = initialized_context().await;
        index_texts(&context, &["doc"]).await;
        context.query("q", 5, 0.0).await.unwrap();

        context.clear_history().await.unwrap();
        assert!(context.history().await.unwrap().is_empty());

        context.clear_history().await.unwrap();
        assert!(context.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_reflects_lifecycle() {
        let context = Arc::new(PipelineContext::new(RagConfig::default()));
        let status = context.status().await;
        assert!(!status.initialized);
        assert_eq!(status.documents_indexed, 0);

        context
            .initialize_with(PipelineComponents {
                embedder: Arc::new(HashEmbedder { dimensions: 16 }),
                store: Arc::new(InMemoryVectorStore::new()),
                generator: Arc::new(EchoGenerator),
            })
            .await
            .unwrap();
        index_texts(&context, &["one"]).await;

        let status = context.status().await;
        assert!(status.initialized);
        assert_eq!(status.documents_indexed, 1);
        assert_eq!(status.llm_model.as_deref(), Some("echo-mock"));
    }

    #[tokio::test]
    async fn reset_clears_index_and_history() {
        let context = initialized_context().await;
        index_texts(&context, &["doc"]).await;
        context.query("q", 5, 0.0).await.unwrap();

        context.reset().await.unwrap();

        assert_eq!(context.document_count().await, 0);
        assert!(context.history().await.unwrap().is_empty());
        assert!(context.is_initialized().await);
    }
}
