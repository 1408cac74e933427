//! Layout Chunker Service - Main Entry Point
//!
//! Serves the layout chunking pipeline over HTTP.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use layout_chunker::api::{build_router, AppState};
use layout_chunker::chunkers::{LayoutChunker, WindowChunker};
use layout_chunker::embedding::{
    HttpEmbeddingProvider, NoopEmbeddingProvider, SharedEmbeddingProvider,
};
use layout_chunker::jobs::{DocumentProcessor, JobStore};
use layout_chunker::types::ChunkingConfig;

/// How often expired jobs are swept from the store.
const JOB_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "layout_chunker=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ChunkingConfig::from_env();
    config.default_options().validate()?;

    info!("Starting Layout Chunker v{}", env!("CARGO_PKG_VERSION"));
    info!(
        min_tokens = config.min_tokens,
        max_tokens = config.max_tokens,
        similarity_threshold = config.similarity_threshold,
        "Default chunk options"
    );

    // Initialize components
    let provider: SharedEmbeddingProvider = match HttpEmbeddingProvider::from_config(&config)? {
        Some(provider) => {
            info!(endpoint = provider.endpoint(), "Using HTTP embedding provider");
            Arc::new(provider)
        }
        None => {
            warn!("EMBEDDING_SERVICE_URL not set, merging by token floor only");
            Arc::new(NoopEmbeddingProvider)
        }
    };

    let chunker = LayoutChunker::new(provider).with_concurrency(config.embedding_concurrency);
    let processor = DocumentProcessor::new(
        Arc::new(chunker),
        WindowChunker::with_window(config.fallback_window_chars),
    );

    let ttl = config
        .job_ttl()
        .with_context(|| format!("JOB_TTL_SECS out of range: {}", config.job_ttl_secs))?;
    let job_store = Arc::new(RwLock::new(JobStore::new(ttl)));
    spawn_job_sweeper(job_store.clone());

    let port = config.port;
    let state = Arc::new(AppState {
        processor: Arc::new(processor),
        job_store,
        config,
    });

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_job_sweeper(job_store: Arc<RwLock<JobStore>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(JOB_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = job_store.write().await.cleanup_expired();
            if removed > 0 {
                debug!(removed, "Removed expired jobs");
            }
        }
    });
}
