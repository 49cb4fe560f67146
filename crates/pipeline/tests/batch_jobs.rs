//! End-to-end tests for the batch job lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use prodscore_core::batch::{BatchJob, BatchRowResult, JobStatus};
use prodscore_core::error::CoreError;
use prodscore_core::features::FeatureVector;
use prodscore_core::scoring::{ModelHandle, Scorer};
use prodscore_core::types::{JobId, RawRecord};
use prodscore_pipeline::source::parse_csv;
use prodscore_pipeline::{
    BatchJobManager, CsvResultSink, CsvSource, JobRegistry, ManagerConfig, ResultSink,
    TabularSource,
};
use tempfile::TempDir;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const HEADER: &str = "date,department,team,targeted_productivity,smv_minutes,over_time_hours,incentive_level,idle_time_minutes,idle_men_count,style_change_count,worker_count";

fn csv_row(department: &str) -> String {
    format!("2023-05-15,{department},Team 3,75,2.5,1,Standard,30,1,2,50")
}

fn csv_of(departments: &[&str]) -> String {
    let mut out = format!("{HEADER}\n");
    for d in departments {
        out.push_str(&csv_row(d));
        out.push('\n');
    }
    out
}

/// Scores every row with the worker count divided by 100.
struct WorkerRatio;

impl Scorer for WorkerRatio {
    fn score(&self, features: &FeatureVector) -> Result<f64, CoreError> {
        Ok(features.get(11).unwrap_or_default() / 100.0)
    }
}

struct Broken;

impl Scorer for Broken {
    fn score(&self, _: &FeatureVector) -> Result<f64, CoreError> {
        Err(CoreError::Internal("corrupt model".to_string()))
    }
}

/// Blocks `read` until the test opens the gate.
struct GatedSource {
    gate: Arc<Notify>,
    rows: Vec<RawRecord>,
}

#[async_trait]
impl TabularSource for GatedSource {
    async fn read(&self, _: &Path) -> Result<Vec<RawRecord>, CoreError> {
        self.gate.notified().await;
        Ok(self.rows.clone())
    }
}

struct FailingSink;

#[async_trait]
impl ResultSink for FailingSink {
    async fn persist(&self, _: JobId, _: &[BatchRowResult]) -> Result<String, CoreError> {
        Err(CoreError::Persistence("disk full".to_string()))
    }

    async fn open(&self, _: JobId, _: &str) -> Result<prodscore_pipeline::Artifact, CoreError> {
        Err(CoreError::MissingArtifact("never written".to_string()))
    }
}

struct Harness {
    dir: TempDir,
    manager: BatchJobManager,
}

impl Harness {
    fn new(model: ModelHandle) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(CsvResultSink::new(dir.path().join("results")));
        Self::with_parts(dir, model, Arc::new(CsvSource), sink, ManagerConfig::default())
    }

    fn with_parts(
        dir: TempDir,
        model: ModelHandle,
        source: Arc<dyn TabularSource>,
        sink: Arc<dyn ResultSink>,
        config: ManagerConfig,
    ) -> Self {
        let manager = BatchJobManager::new(Arc::new(JobRegistry::new()), model, source, sink, config);
        Self { dir, manager }
    }

    fn write_upload(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

async fn wait_until_terminal(manager: &BatchJobManager, id: JobId) -> BatchJob {
    for _ in 0..500 {
        let job = manager.status(id).await.unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not finish in time");
}

/// Number of `ids` not yet in a terminal state.
async fn count_pending(manager: &BatchJobManager, ids: &[JobId]) -> usize {
    let mut pending = 0;
    for id in ids {
        if !manager.status(*id).await.unwrap().status.is_terminal() {
            pending += 1;
        }
    }
    pending
}

fn output_rows(bytes: &[u8]) -> Vec<RawRecord> {
    parse_csv(bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_middle_row_is_isolated() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let upload = h.write_upload("three.csv", &csv_of(&["Sewing", "InvalidDept", "Finishing"]));

    let id = h.manager.submit(upload.clone()).await.unwrap();
    let job = wait_until_terminal(&h.manager, id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.source_path, upload);
    assert!(job.result_location.is_some());
    let summary = job.summary.unwrap();
    assert_eq!((summary.total_rows, summary.invalid_rows), (3, 1));

    let artifact = h.manager.fetch_result(id).await.unwrap();
    let rows = output_rows(&artifact.bytes);
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["actual_productivity"], "0.5");
    assert_eq!(rows[0]["category"], "Medium Productivity");
    assert!(rows[0]["errors"].is_null());

    assert!(rows[1]["actual_productivity"].is_null());
    assert_eq!(rows[1]["category"], "Invalid input data");
    assert!(rows[1]["errors"]
        .as_str()
        .unwrap()
        .contains("Invalid department"));
    assert_eq!(rows[1]["department"], "InvalidDept");

    assert_eq!(rows[2]["actual_productivity"], "0.5");
}

#[tokio::test]
async fn alternating_rows_preserve_input_order() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let departments: Vec<&str> = (0..10)
        .map(|i| if i % 2 == 0 { "Cutting" } else { "Unknown" })
        .collect();
    let upload = h.write_upload("alt.csv", &csv_of(&departments));

    let id = h.manager.submit(upload).await.unwrap();
    assert_eq!(wait_until_terminal(&h.manager, id).await.status, JobStatus::Completed);

    let rows = output_rows(&h.manager.fetch_result(id).await.unwrap().bytes);
    assert_eq!(rows.len(), departments.len());
    for (i, (row, dept)) in rows.iter().zip(&departments).enumerate() {
        assert_eq!(row["department"], *dept, "row {i} out of order");
        if i % 2 == 0 {
            assert!(row["errors"].is_null());
        } else {
            assert_eq!(row["category"], "Invalid input data");
            assert!(!row["errors"].as_str().unwrap().is_empty());
        }
    }
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let id = uuid::Uuid::new_v4();
    assert_matches!(h.manager.status(id).await, Err(CoreError::NotFound { .. }));
    assert_matches!(h.manager.fetch_result(id).await, Err(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn fetch_before_completion_is_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let rows = parse_csv(csv_of(&["Sewing"]).as_bytes()).unwrap();
    let sink = Arc::new(CsvResultSink::new(dir.path().join("results")));
    let h = Harness::with_parts(
        dir,
        ModelHandle::ready(WorkerRatio),
        Arc::new(GatedSource {
            gate: Arc::clone(&gate),
            rows,
        }),
        sink,
        ManagerConfig::default(),
    );

    let id = h.manager.submit(PathBuf::from("gated.csv")).await.unwrap();
    let status = h.manager.status(id).await.unwrap().status;
    assert!(matches!(status, JobStatus::Queued | JobStatus::Processing));
    assert_matches!(h.manager.fetch_result(id).await, Err(CoreError::NotReady(_)));

    gate.notify_one();
    assert_eq!(wait_until_terminal(&h.manager, id).await.status, JobStatus::Completed);
    assert!(h.manager.fetch_result(id).await.is_ok());
}

#[tokio::test]
async fn unreadable_source_fails_job_without_artifact() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let upload = h.write_upload("ragged.csv", "a,b\n1,2,3\n");

    let id = h.manager.submit(upload).await.unwrap();
    let job = wait_until_terminal(&h.manager, id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().starts_with("Source read error"));
    assert!(job.result_location.is_none());
    assert!(!h.dir.path().join("results").join(format!("{id}.csv")).exists());
    assert_matches!(h.manager.fetch_result(id).await, Err(CoreError::NotReady(_)));
}

#[tokio::test]
async fn persistence_failure_fails_job() {
    let dir = tempfile::tempdir().unwrap();
    let upload = dir.path().join("ok.csv");
    std::fs::write(&upload, csv_of(&["Sewing"])).unwrap();
    let h = Harness::with_parts(
        dir,
        ModelHandle::ready(WorkerRatio),
        Arc::new(CsvSource),
        Arc::new(FailingSink),
        ManagerConfig::default(),
    );

    let id = h.manager.submit(upload).await.unwrap();
    let job = wait_until_terminal(&h.manager, id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("Persistence error: disk full"));
}

#[tokio::test]
async fn scorer_failure_fails_job() {
    let h = Harness::new(ModelHandle::ready(Broken));
    let upload = h.write_upload("one.csv", &csv_of(&["Sewing"]));

    let id = h.manager.submit(upload).await.unwrap();
    let job = wait_until_terminal(&h.manager, id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("corrupt model"));
}

#[tokio::test]
async fn unloaded_model_rejects_submission() {
    let h = Harness::new(ModelHandle::unavailable("no artifact"));
    let upload = h.write_upload("one.csv", &csv_of(&["Sewing"]));
    assert_matches!(
        h.manager.submit(upload).await,
        Err(CoreError::ServiceUnavailable(_))
    );
    assert!(h.manager.registry().is_empty().await);
}

#[tokio::test]
async fn deleted_artifact_is_reported_missing() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let upload = h.write_upload("one.csv", &csv_of(&["QC"]));

    let id = h.manager.submit(upload).await.unwrap();
    let job = wait_until_terminal(&h.manager, id).await;
    std::fs::remove_file(job.result_location.unwrap()).unwrap();

    assert_matches!(
        h.manager.fetch_result(id).await,
        Err(CoreError::MissingArtifact(_))
    );
}

#[tokio::test]
async fn concurrency_limit_keeps_extra_jobs_queued() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let rows = parse_csv(csv_of(&["Sewing"]).as_bytes()).unwrap();
    let sink = Arc::new(CsvResultSink::new(dir.path().join("results")));
    let h = Harness::with_parts(
        dir,
        ModelHandle::ready(WorkerRatio),
        Arc::new(GatedSource {
            gate: Arc::clone(&gate),
            rows,
        }),
        sink,
        ManagerConfig {
            max_concurrent_jobs: 1,
        },
    );

    let first = h.manager.submit(PathBuf::from("a.csv")).await.unwrap();
    let second = h.manager.submit(PathBuf::from("b.csv")).await.unwrap();

    // Wait for one job to take the only slot.
    let mut statuses = Vec::new();
    for _ in 0..500 {
        statuses = vec![
            h.manager.status(first).await.unwrap().status,
            h.manager.status(second).await.unwrap().status,
        ];
        if statuses.contains(&JobStatus::Processing) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    statuses.sort_by_key(|s| s.as_str());
    assert_eq!(statuses, vec![JobStatus::Processing, JobStatus::Queued]);

    // Release one job at a time; a notification sent before the waiter
    // registers is kept as a permit.
    gate.notify_one();
    for _ in 0..500 {
        if count_pending(&h.manager, &[first, second]).await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    gate.notify_one();
    assert_eq!(wait_until_terminal(&h.manager, first).await.status, JobStatus::Completed);
    assert_eq!(wait_until_terminal(&h.manager, second).await.status, JobStatus::Completed);
}

#[tokio::test]
async fn shutdown_waits_for_running_jobs() {
    let h = Harness::new(ModelHandle::ready(WorkerRatio));
    let upload = h.write_upload("one.csv", &csv_of(&["Sewing", "Finishing"]));
    let id = h.manager.submit(upload).await.unwrap();

    assert!(h.manager.shutdown(Duration::from_secs(5)).await);
    let status = h.manager.status(id).await.unwrap().status;
    assert!(status.is_terminal());
}
