//! Single-record prediction path.
//!
//! Validator, encoder, scorer and classifier run synchronously in that
//! order. Charts are rendered only after a successful score.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::category::{classify, ProductivityCategory};
use crate::error::CoreError;
use crate::features::encode;
use crate::record::ValidatedRecord;
use crate::scoring::ModelHandle;
use crate::types::RawRecord;
use crate::validation::validate_record_on;
use crate::visualization::{Charts, Visualizer};

/// Score and category of one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "actual_productivity")]
    pub score: f64,
    pub category: ProductivityCategory,
}

/// Response of the single-record path.
#[derive(Debug, Clone, Serialize)]
pub struct SinglePrediction {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub visualizations: Charts,
}

/// Score an already validated record.
pub fn score_record(
    model: &ModelHandle,
    record: &ValidatedRecord,
) -> Result<PredictionResult, CoreError> {
    let score = model.score(&encode(record))?;
    Ok(PredictionResult {
        score,
        category: classify(score),
    })
}

/// Run the full single-record path against today's local date.
pub fn predict(
    model: &ModelHandle,
    visualizer: &dyn Visualizer,
    raw: &RawRecord,
) -> Result<SinglePrediction, CoreError> {
    predict_on(model, visualizer, raw, Local::now().date_naive())
}

/// Run the full single-record path.
///
/// An unloaded model fails with `ServiceUnavailable` before the record is
/// even looked at; validation failures return every violation without
/// touching the scorer.
pub fn predict_on(
    model: &ModelHandle,
    visualizer: &dyn Visualizer,
    raw: &RawRecord,
    today: NaiveDate,
) -> Result<SinglePrediction, CoreError> {
    model.ensure_ready()?;

    let record = validate_record_on(raw, today).map_err(CoreError::Validation)?;
    let result = score_record(model, &record)?;

    let visualizations = visualizer.render(&record).map_err(|e| match e {
        CoreError::Prediction(_) => e,
        other => CoreError::Prediction(other.to_string()),
    })?;

    Ok(SinglePrediction {
        result,
        visualizations,
    })
}
