//! Document processor with fallback chunking.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::store::JobStore;
use crate::chunkers::{Chunker, WindowChunker};
use crate::error::{ChunkError, Result};
use crate::types::{ChunkOptions, ChunkingStrategy, LayoutBlock, TextChunk};

/// Outcome of chunking one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub chunks: Vec<TextChunk>,
    pub strategy: ChunkingStrategy,
    pub warning: Option<String>,
}

/// Runs the primary chunker and falls back to fixed windows when it fails.
///
/// A panic inside the primary chunker counts as a failure. Invalid options
/// are not retried with the fallback; they are a caller error and are
/// returned as-is.
pub struct DocumentProcessor {
    primary: Arc<dyn Chunker>,
    fallback: WindowChunker,
}

impl DocumentProcessor {
    /// Create a processor around the given primary chunker.
    pub fn new(primary: Arc<dyn Chunker>, fallback: WindowChunker) -> Self {
        Self { primary, fallback }
    }

    /// Name of the primary chunker.
    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    /// Chunk one document.
    pub async fn process(
        &self,
        blocks: &[LayoutBlock],
        options: &ChunkOptions,
    ) -> Result<ProcessedDocument> {
        options.validate()?;

        let primary = AssertUnwindSafe(self.primary.chunk(blocks, options))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ChunkError::Internal(panic_message(panic.as_ref()))));

        match primary {
            Ok(chunks) => Ok(ProcessedDocument {
                chunks,
                strategy: ChunkingStrategy::Structural,
                warning: None,
            }),
            Err(e @ ChunkError::InvalidOptions(_)) => Err(e),
            Err(e) => {
                warn!(
                    chunker = self.primary.name(),
                    error = %e,
                    "Primary chunker failed, using fallback"
                );
                let chunks = self.fallback.chunk(blocks, options).await?;
                Ok(ProcessedDocument {
                    chunks,
                    strategy: ChunkingStrategy::Fallback,
                    warning: Some(format!("{} chunker failed: {e}", self.primary.name())),
                })
            }
        }
    }

    /// Process a queued job and record the outcome in the store.
    ///
    /// The job always ends up completed or failed, even if processing panics.
    pub async fn process_job(
        &self,
        job_id: Uuid,
        blocks: Vec<LayoutBlock>,
        options: ChunkOptions,
        job_store: Arc<RwLock<JobStore>>,
    ) {
        info!(job_id = %job_id, blocks = blocks.len(), "Starting job processing");

        {
            let mut store = job_store.write().await;
            store.start_job(job_id);
        }

        let outcome = AssertUnwindSafe(self.process(&blocks, &options))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ChunkError::Internal(panic_message(panic.as_ref()))));

        let mut store = job_store.write().await;
        match outcome {
            Ok(doc) => {
                info!(
                    job_id = %job_id,
                    chunks = doc.chunks.len(),
                    strategy = %doc.strategy,
                    "Job processing complete"
                );
                store.complete_job(job_id, doc.chunks, doc.strategy, doc.warning);
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job processing failed");
                store.fail_job(job_id, e.to_string());
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::chunkers::LayoutChunker;
    use crate::embedding::NoopEmbeddingProvider;
    use crate::types::ChunkJobStatus;
    use pretty_assertions::assert_eq;

    struct BrokenChunker;

    #[async_trait]
    impl Chunker for BrokenChunker {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn chunk(&self, _: &[LayoutBlock], _: &ChunkOptions) -> Result<Vec<TextChunk>> {
            Err(ChunkError::Internal("boom".to_string()))
        }
    }

    struct PanickingChunker;

    #[async_trait]
    impl Chunker for PanickingChunker {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn chunk(&self, _: &[LayoutBlock], _: &ChunkOptions) -> Result<Vec<TextChunk>> {
            panic!("stage exploded")
        }
    }

    fn blocks() -> Vec<LayoutBlock> {
        vec![
            LayoutBlock::heading("h1", 1, "Title").on_page(1),
            LayoutBlock::paragraph("p1", "Body text.").on_page(1),
        ]
    }

    #[tokio::test]
    async fn test_structural_path() {
        let processor = DocumentProcessor::new(
            Arc::new(LayoutChunker::new(Arc::new(NoopEmbeddingProvider))),
            WindowChunker::new(),
        );

        let doc = processor.process(&blocks(), &ChunkOptions::default()).await.unwrap();
        assert_eq!(doc.strategy, ChunkingStrategy::Structural);
        assert!(doc.warning.is_none());
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].heading_path, vec!["Title".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let processor = DocumentProcessor::new(Arc::new(BrokenChunker), WindowChunker::new());

        let doc = processor.process(&blocks(), &ChunkOptions::default()).await.unwrap();
        assert_eq!(doc.strategy, ChunkingStrategy::Fallback);
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].text, "Title\n\nBody text.");
        assert!(doc.warning.unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_falls_back_on_panic() {
        let processor = DocumentProcessor::new(Arc::new(PanickingChunker), WindowChunker::new());

        let doc = processor.process(&blocks(), &ChunkOptions::default()).await.unwrap();
        assert_eq!(doc.strategy, ChunkingStrategy::Fallback);
        assert_eq!(doc.chunks[0].text, "Title\n\nBody text.");
        assert!(doc.warning.unwrap().contains("stage exploded"));
    }

    #[tokio::test]
    async fn test_panicking_job_finishes_and_expires() {
        let processor = Arc::new(DocumentProcessor::new(
            Arc::new(PanickingChunker),
            WindowChunker::new(),
        ));
        let store = Arc::new(RwLock::new(JobStore::new(chrono::Duration::zero())));
        let job_id = store.write().await.create_job(2);

        let task = {
            let processor = processor.clone();
            let store = store.clone();
            tokio::spawn(async move {
                processor
                    .process_job(job_id, blocks(), ChunkOptions::default(), store)
                    .await
            })
        };
        assert!(task.await.is_ok());

        let counts = store.read().await.get_job_counts();
        assert_eq!(counts.get(&ChunkJobStatus::Completed), Some(&1));
        assert_eq!(counts.get(&ChunkJobStatus::Running), None);

        assert_eq!(store.write().await.cleanup_expired(), 1);
    }

    #[tokio::test]
    async fn test_invalid_options_not_retried() {
        let processor = DocumentProcessor::new(Arc::new(BrokenChunker), WindowChunker::new());
        let result = processor
            .process(&blocks(), &ChunkOptions::with_bounds(10, 0))
            .await;
        assert!(matches!(result, Err(ChunkError::InvalidOptions(_))));
    }

    #[tokio::test]
    async fn test_process_job_records_outcome() {
        let processor = DocumentProcessor::new(Arc::new(BrokenChunker), WindowChunker::new());
        let store = Arc::new(RwLock::new(JobStore::default()));
        let job_id = store.write().await.create_job(2);

        processor
            .process_job(job_id, blocks(), ChunkOptions::default(), store.clone())
            .await;

        let status = store.read().await.get_job_status(job_id).unwrap();
        assert_eq!(status.status, ChunkJobStatus::Completed);
        assert_eq!(status.strategy, Some(ChunkingStrategy::Fallback));
        assert!(status.message.is_some());
    }

    #[tokio::test]
    async fn test_process_job_failure() {
        let processor = DocumentProcessor::new(Arc::new(BrokenChunker), WindowChunker::new());
        let store = Arc::new(RwLock::new(JobStore::default()));
        let job_id = store.write().await.create_job(1);

        processor
            .process_job(job_id, blocks(), ChunkOptions::with_bounds(10, 0), store.clone())
            .await;

        let status = store.read().await.get_job_status(job_id).unwrap();
        assert_eq!(status.status, ChunkJobStatus::Failed);
        assert!(status.chunks.is_none());
    }
}
