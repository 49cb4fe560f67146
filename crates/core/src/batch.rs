//! Batch job records and per-row processing.
//!
//! A row's validation failure is data: it becomes an [`RowOutcome::Invalid`]
//! entry in the output and never aborts the job. Only systemic failures
//! (model unavailable, scorer error) surface as `Err`.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::ProductivityCategory;
use crate::error::CoreError;
use crate::prediction::score_record;
use crate::scoring::ModelHandle;
use crate::types::{JobId, RawRecord, Timestamp};
use crate::validation::validate_record_on;

/// Category written for rows that failed validation.
pub const INVALID_CATEGORY: &str = "Invalid input data";

/// Separator between validation messages in the `errors` column.
pub const ERROR_SEPARATOR: &str = "; ";

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Job record
// ---------------------------------------------------------------------------

/// Row counts recorded when a job completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub scored_rows: usize,
    pub invalid_rows: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[BatchRowResult]) -> Self {
        let invalid_rows = rows.iter().filter(|r| !r.is_scored()).count();
        Self {
            total_rows: rows.len(),
            scored_rows: rows.len() - invalid_rows,
            invalid_rows,
        }
    }
}

/// One batch job as held in the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchJob {
    pub id: JobId,
    pub status: JobStatus,
    pub source_path: PathBuf,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,
}

impl BatchJob {
    /// A freshly accepted job in the `Queued` state.
    pub fn queued(id: JobId, source_path: PathBuf) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            source_path,
            created_at: chrono::Utc::now(),
            result_location: None,
            error: None,
            summary: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Row results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Scored {
        score: f64,
        category: ProductivityCategory,
    },
    Invalid {
        errors: Vec<String>,
    },
}

/// One output row: the input fields as received plus the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRowResult {
    pub fields: RawRecord,
    pub outcome: RowOutcome,
}

impl BatchRowResult {
    pub fn is_scored(&self) -> bool {
        matches!(self.outcome, RowOutcome::Scored { .. })
    }

    /// Value of the `category` column.
    pub fn category_label(&self) -> &'static str {
        match &self.outcome {
            RowOutcome::Scored { category, .. } => category.label(),
            RowOutcome::Invalid { .. } => INVALID_CATEGORY,
        }
    }

    /// Value of the `actual_productivity` column.
    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            RowOutcome::Scored { score, .. } => Some(score),
            RowOutcome::Invalid { .. } => None,
        }
    }

    /// Value of the `errors` column.
    pub fn joined_errors(&self) -> Option<String> {
        match &self.outcome {
            RowOutcome::Scored { .. } => None,
            RowOutcome::Invalid { errors } => Some(errors.join(ERROR_SEPARATOR)),
        }
    }
}

/// Process one input row.
pub fn process_row(
    model: &ModelHandle,
    raw: RawRecord,
    today: NaiveDate,
) -> Result<BatchRowResult, CoreError> {
    let outcome = match validate_record_on(&raw, today) {
        Ok(record) => {
            let result = score_record(model, &record)?;
            RowOutcome::Scored {
                score: result.score,
                category: result.category,
            }
        }
        Err(errors) => RowOutcome::Invalid { errors },
    };
    Ok(BatchRowResult {
        fields: raw,
        outcome,
    })
}

/// Process rows in order, stopping only on a systemic failure.
pub fn process_rows(
    model: &ModelHandle,
    rows: Vec<RawRecord>,
    today: NaiveDate,
) -> Result<Vec<BatchRowResult>, CoreError> {
    model.ensure_ready()?;
    rows.into_iter()
        .map(|raw| process_row(model, raw, today))
        .collect()
}
