//! Request/response definitions for the chunking API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChunkOptionsOverride, LayoutBlock, TextChunk};

/// Which chunker produced a document's chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Structural grouping, splitting and semantic merging
    Structural,
    /// Fixed-length character windows, used when the structural pipeline fails
    Fallback,
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingStrategy::Structural => write!(f, "structural"),
            ChunkingStrategy::Fallback => write!(f, "fallback"),
        }
    }
}

/// Request to chunk one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDocumentRequest {
    /// Layout blocks in reading order
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,

    /// Optional overrides for the service's default options
    #[serde(default)]
    pub options: ChunkOptionsOverride,
}

/// Chunks produced for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDocumentResponse {
    /// Final chunks in document order
    pub chunks: Vec<TextChunk>,

    /// Chunker that produced them
    pub strategy: ChunkingStrategy,

    /// Set when the fallback chunker was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Response when starting a chunking job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChunkJobResponse {
    /// ID of the created job
    pub job_id: Uuid,

    /// Whether the job was accepted
    pub accepted: bool,

    /// Number of blocks queued
    pub block_count: usize,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status of a chunking job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkJobStatus {
    /// Job is queued but not started
    Pending,
    /// Job is currently running
    Running,
    /// Job completed successfully
    Completed,
    /// Job failed
    Failed,
}

impl ChunkJobStatus {
    /// Whether the job has reached a final state.
    pub fn is_finished(&self) -> bool {
        matches!(self, ChunkJobStatus::Completed | ChunkJobStatus::Failed)
    }
}

/// Response with job status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkJobStatusResponse {
    /// ID of the job
    pub job_id: Uuid,

    /// Current status
    pub status: ChunkJobStatus,

    /// Number of input blocks
    pub block_count: usize,

    /// Chunks, once the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<TextChunk>>,

    /// Chunker that produced the chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ChunkingStrategy>,

    /// Degradation warning or error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the job started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// When the job record will be discarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
