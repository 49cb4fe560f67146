//! Batch job manager.
//!
//! Accepts batch sources, runs each job as a background Tokio task and
//! answers status / download queries from the shared [`JobRegistry`].
//! At most `max_concurrent_jobs` jobs execute at once; the rest wait in the
//! `Queued` state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use prodscore_core::batch::{process_rows, BatchJob, BatchSummary, JobStatus};
use prodscore_core::error::CoreError;
use prodscore_core::scoring::ModelHandle;
use prodscore_core::types::JobId;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

use crate::registry::JobRegistry;
use crate::sink::{Artifact, ResultSink};
use crate::source::TabularSource;

/// Default number of jobs allowed to execute concurrently.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct ManagerConfig {
    pub max_concurrent_jobs: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
        }
    }
}

/// Owner of the batch job lifecycle. Cheap to clone.
#[derive(Clone)]
pub struct BatchJobManager {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<JobRegistry>,
    model: ModelHandle,
    source: Arc<dyn TabularSource>,
    sink: Arc<dyn ResultSink>,
    permits: Semaphore,
    tracker: TaskTracker,
}

impl BatchJobManager {
    pub fn new(
        registry: Arc<JobRegistry>,
        model: ModelHandle,
        source: Arc<dyn TabularSource>,
        sink: Arc<dyn ResultSink>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                model,
                source,
                sink,
                permits: Semaphore::new(config.max_concurrent_jobs.max(1)),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Register a job for `source_path` and start it in the background.
    ///
    /// Returns as soon as the job is registered as `Queued`. Fails only if
    /// no model is loaded; read and persistence problems are reported later
    /// through [`status`](Self::status).
    pub async fn submit(&self, source_path: PathBuf) -> Result<JobId, CoreError> {
        self.inner.model.ensure_ready()?;

        let id = uuid::Uuid::new_v4();
        self.inner
            .registry
            .insert(BatchJob::queued(id, source_path.clone()))
            .await;
        tracing::info!(job_id = %id, source = %source_path.display(), "Batch job queued");

        let manager = self.clone();
        self.inner.tracker.spawn(async move {
            manager.run(id, source_path).await;
        });

        Ok(id)
    }

    /// Current snapshot of a job.
    pub async fn status(&self, id: JobId) -> Result<BatchJob, CoreError> {
        self.inner
            .registry
            .get(id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "BatchJob",
                id: id.to_string(),
            })
    }

    /// Load the result artifact of a completed job.
    pub async fn fetch_result(&self, id: JobId) -> Result<Artifact, CoreError> {
        let job = self.status(id).await?;
        if job.status != JobStatus::Completed {
            return Err(CoreError::NotReady("Batch job not completed".to_string()));
        }
        let location = job.result_location.ok_or_else(|| {
            CoreError::MissingArtifact("Completed job has no result location".to_string())
        })?;
        self.inner.sink.open(id, &location).await
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.inner.registry
    }

    /// Stop accepting background work and wait for running jobs.
    ///
    /// Returns `false` if jobs were still running when `timeout` elapsed.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.inner.tracker.close();
        self.inner.permits.close();
        tokio::time::timeout(timeout, self.inner.tracker.wait())
            .await
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    async fn run(&self, id: JobId, source_path: PathBuf) {
        let registry = &self.inner.registry;

        let Ok(_permit) = self.inner.permits.acquire().await else {
            registry
                .mark_failed(id, "Job scheduler shut down before the job started".into())
                .await;
            tracing::warn!(job_id = %id, "Batch job dropped at shutdown");
            return;
        };

        registry.mark_processing(id).await;
        tracing::info!(job_id = %id, "Batch job processing");

        match self.execute(id, &source_path).await {
            Ok((location, summary)) => {
                registry.mark_completed(id, location, summary).await;
                tracing::info!(
                    job_id = %id,
                    rows = summary.total_rows,
                    invalid_rows = summary.invalid_rows,
                    "Batch job completed",
                );
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Batch job failed");
                registry.mark_failed(id, e.to_string()).await;
            }
        }
    }

    async fn execute(
        &self,
        id: JobId,
        source_path: &Path,
    ) -> Result<(String, BatchSummary), CoreError> {
        let rows = self.inner.source.read(source_path).await?;
        tracing::debug!(job_id = %id, rows = rows.len(), "Batch source read");

        let model = self.inner.model.clone();
        let today = Local::now().date_naive();
        let results = tokio::task::spawn_blocking(move || process_rows(&model, rows, today))
            .await
            .map_err(|e| CoreError::Internal(format!("row processing task failed: {e}")))??;

        let summary = BatchSummary::from_rows(&results);
        let location = self.inner.sink.persist(id, &results).await?;
        Ok((location, summary))
    }
}
