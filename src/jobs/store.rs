//! Job store for tracking pending and finished documents.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::types::{ChunkJobStatus, ChunkJobStatusResponse, ChunkingStrategy, TextChunk};

/// In-memory store of chunking jobs.
///
/// Finished jobs expire after the configured TTL and are removed by
/// [`JobStore::cleanup_expired`]. Unfinished jobs never expire.
pub struct JobStore {
    jobs: HashMap<Uuid, JobRecord>,
    ttl: Duration,
}

/// Internal record for tracking a job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub status: ChunkJobStatus,
    pub block_count: usize,
    pub chunks: Option<Vec<TextChunk>>,
    pub strategy: Option<ChunkingStrategy>,
    pub message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a new job record.
    pub fn new(job_id: Uuid, block_count: usize) -> Self {
        Self {
            job_id,
            status: ChunkJobStatus::Pending,
            block_count,
            chunks: None,
            strategy: None,
            message: None,
            started_at: None,
            completed_at: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the job as started.
    pub fn start(&mut self) {
        self.status = ChunkJobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the job as completed with its chunks.
    pub fn complete(
        &mut self,
        chunks: Vec<TextChunk>,
        strategy: ChunkingStrategy,
        warning: Option<String>,
        ttl: Duration,
    ) {
        let now = Utc::now();
        self.status = ChunkJobStatus::Completed;
        self.chunks = Some(chunks);
        self.strategy = Some(strategy);
        self.message = warning;
        self.completed_at = Some(now);
        self.expires_at = Some(now + ttl);
    }

    /// Mark the job as failed.
    pub fn fail(&mut self, error: String, ttl: Duration) {
        let now = Utc::now();
        self.status = ChunkJobStatus::Failed;
        self.message = Some(error);
        self.completed_at = Some(now);
        self.expires_at = Some(now + ttl);
    }

    /// Whether the record has finished and outlived its TTL.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status.is_finished() && self.expires_at.map_or(false, |t| t <= now)
    }

    /// Convert to response type.
    pub fn to_response(&self) -> ChunkJobStatusResponse {
        ChunkJobStatusResponse {
            job_id: self.job_id,
            status: self.status,
            block_count: self.block_count,
            chunks: self.chunks.clone(),
            strategy: self.strategy,
            message: self.message.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            expires_at: self.expires_at,
        }
    }
}

impl JobStore {
    /// Create a job store whose finished jobs live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: HashMap::new(),
            ttl,
        }
    }

    /// Create a new job and return its ID.
    pub fn create_job(&mut self, block_count: usize) -> Uuid {
        let job_id = Uuid::new_v4();
        self.jobs.insert(job_id, JobRecord::new(job_id, block_count));
        job_id
    }

    /// Get a job by ID, unless it has expired.
    pub fn get_job(&self, job_id: Uuid) -> Option<&JobRecord> {
        self.jobs
            .get(&job_id)
            .filter(|job| !job.is_expired(Utc::now()))
    }

    /// Start a job.
    pub fn start_job(&mut self, job_id: Uuid) -> bool {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.start();
            true
        } else {
            false
        }
    }

    /// Complete a job.
    pub fn complete_job(
        &mut self,
        job_id: Uuid,
        chunks: Vec<TextChunk>,
        strategy: ChunkingStrategy,
        warning: Option<String>,
    ) -> bool {
        let ttl = self.ttl;
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.complete(chunks, strategy, warning, ttl);
            true
        } else {
            false
        }
    }

    /// Fail a job.
    pub fn fail_job(&mut self, job_id: Uuid, error: String) -> bool {
        let ttl = self.ttl;
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.fail(error, ttl);
            true
        } else {
            false
        }
    }

    /// Get job status as response.
    pub fn get_job_status(&self, job_id: Uuid) -> Option<ChunkJobStatusResponse> {
        self.get_job(job_id).map(JobRecord::to_response)
    }

    /// Remove expired jobs, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.jobs.len();
        self.jobs.retain(|_, job| !job.is_expired(now));
        before - self.jobs.len()
    }

    /// Get count of jobs by status.
    pub fn get_job_counts(&self) -> HashMap<ChunkJobStatus, usize> {
        let mut counts = HashMap::new();
        for job in self.jobs.values() {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }

    /// Number of stored jobs, expired ones included.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut store = JobStore::default();
        let job_id = store.create_job(3);
        assert_eq!(store.get_job(job_id).unwrap().status, ChunkJobStatus::Pending);

        assert!(store.start_job(job_id));
        assert_eq!(store.get_job(job_id).unwrap().status, ChunkJobStatus::Running);

        let chunk = TextChunk::new("chunk_1", "Done.", vec![], [1], vec![]);
        assert!(store.complete_job(job_id, vec![chunk], ChunkingStrategy::Structural, None));

        let status = store.get_job_status(job_id).unwrap();
        assert_eq!(status.status, ChunkJobStatus::Completed);
        assert_eq!(status.block_count, 3);
        assert_eq!(status.chunks.map(|c| c.len()), Some(1));
        assert_eq!(status.strategy, Some(ChunkingStrategy::Structural));
        assert!(status.expires_at.is_some());
    }

    #[test]
    fn test_unknown_job() {
        let mut store = JobStore::default();
        assert!(!store.start_job(Uuid::new_v4()));
        assert!(!store.fail_job(Uuid::new_v4(), "boom".into()));
        assert!(store.get_job_status(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_expired_jobs_are_hidden_and_removed() {
        let mut store = JobStore::new(Duration::zero());
        let finished = store.create_job(1);
        let pending = store.create_job(1);
        store.fail_job(finished, "boom".into());

        assert!(store.get_job(finished).is_none());
        assert!(store.get_job(pending).is_some());

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_job_counts() {
        let mut store = JobStore::default();
        let a = store.create_job(1);
        store.create_job(1);
        store.start_job(a);

        let counts = store.get_job_counts();
        assert_eq!(counts.get(&ChunkJobStatus::Pending), Some(&1));
        assert_eq!(counts.get(&ChunkJobStatus::Running), Some(&1));
    }
}
