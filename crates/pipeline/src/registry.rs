use std::collections::HashMap;

use prodscore_core::batch::{BatchJob, BatchSummary, JobStatus};
use prodscore_core::types::JobId;
use tokio::sync::RwLock;

/// In-memory store of every batch job accepted since startup.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the job manager and status readers. Each transition is a
/// single write-locked mutation, so readers never see a half-updated job.
/// Jobs are never evicted.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, BatchJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: BatchJob) {
        self.jobs.write().await.insert(job.id, job);
    }

    /// Snapshot of one job.
    pub async fn get(&self, id: JobId) -> Option<BatchJob> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Apply `f` to a job under the write lock.
    ///
    /// Returns `false` if the id is unknown.
    pub async fn update(&self, id: JobId, f: impl FnOnce(&mut BatchJob)) -> bool {
        match self.jobs.write().await.get_mut(&id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    pub async fn mark_processing(&self, id: JobId) -> bool {
        self.update(id, |job| job.status = JobStatus::Processing).await
    }

    pub async fn mark_completed(&self, id: JobId, location: String, summary: BatchSummary) -> bool {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.result_location = Some(location);
            job.summary = Some(summary);
            job.error = None;
        })
        .await
    }

    pub async fn mark_failed(&self, id: JobId, error: String) -> bool {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
            job.result_location = None;
        })
        .await
    }
}
