//! Persistence of batch results as downloadable artifacts.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use prodscore_core::batch::BatchRowResult;
use prodscore_core::error::CoreError;
use prodscore_core::types::JobId;
use serde_json::Value;

/// Output columns appended after the input columns.
pub const SCORE_COLUMN: &str = "actual_productivity";
pub const CATEGORY_COLUMN: &str = "category";
pub const ERRORS_COLUMN: &str = "errors";

const OUTPUT_COLUMNS: [&str; 3] = [SCORE_COLUMN, CATEGORY_COLUMN, ERRORS_COLUMN];

/// A persisted result set ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Store the ordered rows for a job and return the artifact reference.
    async fn persist(&self, id: JobId, rows: &[BatchRowResult]) -> Result<String, CoreError>;

    /// Load a previously persisted artifact.
    async fn open(&self, id: JobId, location: &str) -> Result<Artifact, CoreError>;
}

/// Writes one CSV file per job into a results directory.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    dir: PathBuf,
}

impl CsvResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: JobId) -> PathBuf {
        self.dir.join(format!("{id}.csv"))
    }
}

/// Download name offered for a job's results.
pub fn download_name(id: JobId) -> String {
    format!("employee_performance_batch_{id}.csv")
}

#[async_trait]
impl ResultSink for CsvResultSink {
    async fn persist(&self, id: JobId, rows: &[BatchRowResult]) -> Result<String, CoreError> {
        let bytes = render_csv(rows)?;
        let persist_err = |e: io::Error| CoreError::Persistence(e.to_string());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(persist_err)?;

        // Write then rename so a reader never sees a partial file.
        let path = self.path_for(id);
        let tmp = path.with_extension("csv.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(persist_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(persist_err)?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn open(&self, id: JobId, location: &str) -> Result<Artifact, CoreError> {
        let bytes = tokio::fs::read(location).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                CoreError::MissingArtifact("Results file not found".to_string())
            }
            _ => CoreError::Internal(format!("cannot read results file: {e}")),
        })?;
        Ok(Artifact {
            file_name: download_name(id),
            content_type: "text/csv",
            bytes,
        })
    }
}

/// Render rows as CSV: input columns in first-seen order, then
/// `actual_productivity`, `category` and `errors`.
///
/// Input columns sharing a name with an output column are replaced.
pub fn render_csv(rows: &[BatchRowResult]) -> Result<Vec<u8>, CoreError> {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for name in row.fields.keys() {
            if !OUTPUT_COLUMNS.contains(&name.as_str()) && !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let write_err = |e: csv::Error| CoreError::Persistence(e.to_string());
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().copied().chain(OUTPUT_COLUMNS))
        .map_err(write_err)?;

    for row in rows {
        let mut record: Vec<String> = columns
            .iter()
            .map(|name| row.fields.get(*name).map(cell_text).unwrap_or_default())
            .collect();
        record.push(row.score().map(|s| s.to_string()).unwrap_or_default());
        record.push(row.category_label().to_string());
        record.push(row.joined_errors().unwrap_or_default());
        writer.write_record(&record).map_err(write_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::Persistence(e.to_string()))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
