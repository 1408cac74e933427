//! HTTP request handlers for the chunking service.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ChunkError;
use crate::jobs::{DocumentProcessor, JobStore};
use crate::types::{
    ChunkDocumentRequest, ChunkDocumentResponse, ChunkJobStatus, ChunkingConfig,
    StartChunkJobResponse,
};

/// Application state shared across handlers.
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
    pub job_store: Arc<RwLock<JobStore>>,
    pub config: ChunkingConfig,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    chunker: String,
    jobs: HashMap<ChunkJobStatus, usize>,
}

/// Error body returned by failing handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Chunking error mapped onto an HTTP status.
pub struct ApiError(ChunkError);

impl From<ChunkError> for ApiError {
    fn from(e: ChunkError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ChunkError::InvalidOptions(_) => StatusCode::BAD_REQUEST,
            ChunkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let jobs = state.job_store.read().await.get_job_counts();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chunker: state.processor.primary_name().to_string(),
        jobs,
    })
}

/// Chunk a document and return its chunks.
pub async fn chunk_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkDocumentRequest>,
) -> Result<Json<ChunkDocumentResponse>, ApiError> {
    let options = request.options.resolve(state.config.default_options());

    info!(
        blocks = request.blocks.len(),
        min_tokens = options.min_tokens,
        max_tokens = options.max_tokens,
        "Received chunk request"
    );

    let doc = state.processor.process(&request.blocks, &options).await?;

    Ok(Json(ChunkDocumentResponse {
        chunks: doc.chunks,
        strategy: doc.strategy,
        warning: doc.warning,
    }))
}

/// Start a background chunking job.
pub async fn start_chunk_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkDocumentRequest>,
) -> Result<Json<StartChunkJobResponse>, ApiError> {
    let block_count = request.blocks.len();

    if block_count == 0 {
        return Ok(Json(StartChunkJobResponse {
            job_id: Uuid::nil(),
            accepted: false,
            block_count: 0,
            message: Some("No blocks provided".to_string()),
        }));
    }

    let options = request.options.resolve(state.config.default_options());
    options.validate()?;

    let job_id = {
        let mut store = state.job_store.write().await;
        store.create_job(block_count)
    };

    info!(job_id = %job_id, blocks = block_count, "Received chunk job request");

    let processor = state.processor.clone();
    let job_store = state.job_store.clone();
    tokio::spawn(async move {
        processor
            .process_job(job_id, request.blocks, options, job_store)
            .await;
    });

    Ok(Json(StartChunkJobResponse {
        job_id,
        accepted: true,
        block_count,
        message: None,
    }))
}

/// Get job status.
pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let store = state.job_store.read().await;

    match store.get_job_status(job_id) {
        Some(status) => Ok(Json(status)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
