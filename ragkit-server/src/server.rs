//! axum router and request handlers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use ragkit::{PipelineContext, QueryResponse, RagError};

use crate::models::{
    DataLoadRequest, HistoryResponse, InitializeRequest, MessageResponse, QueryRequest,
};

/// Shared handler state: the pipeline context, injected rather than global.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline every handler operates on.
    pub context: Arc<PipelineContext>,
}

/// Bind address for the HTTP server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/init", post(init))
        .route("/load-documents", post(load_documents))
        .route("/query", post(query))
        .route("/status", get(status))
        .route("/history", get(history))
        .route("/clear-history", post(clear_history))
        .route("/reset", delete(reset))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Initialize the pipeline and index any existing data directory.
///
/// Failures are logged as warnings; the server still comes up and `/init`
/// stays available.
pub async fn startup(context: &PipelineContext) {
    if let Err(e) = context.initialize().await {
        warn!(error = %e, "startup initialization failed; pipeline can be initialized via /init");
        return;
    }

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let data_dir = Path::new(&data_dir);
    if data_dir.exists() {
        info!(directory = %data_dir.display(), "found data directory, indexing");
        match context.load_directory(data_dir).await {
            Ok(chunk_count) => info!(chunk_count, "startup indexing complete"),
            Err(e) => warn!(error = %e, "startup indexing failed"),
        }
    }
}

/// Serve the application until the process exits.
pub async fn run_server(config: ServerConfig, context: Arc<PipelineContext>) -> anyhow::Result<()> {
    let app = app_router(AppState { context });
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for ragkit-server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ragkit-server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "RAG query service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "query": "/query",
            "init": "/init",
            "load-documents": "/load-documents",
            "status": "/status",
            "history": "/history",
            "health": "/health",
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = state.context.status().await;
    Json(json!({
        "status": "healthy",
        "pipeline_initialized": status.initialized,
        "documents_indexed": status.documents_indexed,
    }))
}

async fn init(
    State(state): State<AppState>,
    Json(request): Json<InitializeRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state
        .context
        .initialize_with_models(request.model_name, request.llm_model)
        .await
        .map_err(|e| {
            error!(error = %e, "pipeline initialization failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to initialize pipeline: {e}"))
        })?;

    Ok(Json(MessageResponse {
        status: "success".to_string(),
        message: "Pipeline initialized".to_string(),
    }))
}

async fn load_documents(
    State(state): State<AppState>,
    Json(request): Json<DataLoadRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let directory = PathBuf::from(&request.data_directory);
    if !directory.exists() {
        return Err((StatusCode::BAD_REQUEST, "Directory not found".to_string()));
    }

    // Indexing can take a while; run it in the background so the request
    // does not time out
    let context = state.context.clone();
    tokio::spawn(async move {
        match context.load_directory(&directory).await {
            Ok(chunk_count) => info!(chunk_count, "background indexing complete"),
            Err(e) => error!(error = %e, "background indexing failed"),
        }
    });

    Ok(Json(MessageResponse {
        status: "loading".to_string(),
        message: "Documents loading in background".to_string(),
    }))
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, String)> {
    if request.question.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question cannot be empty".to_string()));
    }

    match state.context.query(&request.question, request.top_k, request.min_score).await {
        Ok(response) => Ok(Json(response)),
        Err(RagError::NotInitialized) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Pipeline not initialized. Call /init first.".to_string(),
        )),
        Err(e) => {
            error!(error = %e, "query failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let status = state.context.status().await;
    if !status.initialized {
        return Json(json!({"status": "not_initialized"}));
    }

    Json(json!({
        "status": "ready",
        "documents_indexed": status.documents_indexed,
        "embedding_model": status.embedding_model,
        "llm_model": status.llm_model,
    }))
}

async fn history(
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, (StatusCode, String)> {
    let history = state.context.history().await.map_err(not_initialized)?;
    let count = history.len();
    Ok(Json(HistoryResponse { history, count }))
}

async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state.context.clear_history().await.map_err(not_initialized)?;
    Ok(Json(MessageResponse {
        status: "success".to_string(),
        message: "History cleared".to_string(),
    }))
}

async fn reset(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    state.context.reset().await.map_err(|e| match e {
        RagError::NotInitialized => not_initialized(e),
        other => {
            error!(error = %other, "pipeline reset failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    })?;

    Ok(Json(MessageResponse {
        status: "success".to_string(),
        message: "Pipeline reset".to_string(),
    }))
}

fn not_initialized(_: RagError) -> (StatusCode, String) {
    (StatusCode::SERVICE_UNAVAILABLE, "Pipeline not initialized".to_string())
}
