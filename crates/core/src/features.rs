//! Feature encoding for the productivity model.
//!
//! The component order of [`FeatureVector`] is the order the model was
//! trained on. Reordering it does not fail loudly; it silently produces
//! wrong predictions.

use chrono::Datelike;
use serde::Serialize;

use crate::record::{Department, IncentiveLevel, ValidatedRecord};

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 13;

/// Component names, index-aligned with [`FeatureVector::as_slice`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "quarter",
    "department",
    "day",
    "team",
    "targeted_productivity",
    "smv",
    "over_time",
    "incentive",
    "idle_time",
    "idle_men",
    "no_of_style_change",
    "no_of_workers",
    "month",
];

/// Fixed-order numeric encoding of one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

/// Department code used at training time.
///
/// Only Sewing and Finishing were present in the training data; Cutting
/// and QC share Sewing's code.
pub fn department_code(department: Department) -> f64 {
    match department {
        Department::Finishing => 0.0,
        Department::Sewing | Department::Cutting | Department::Qc => 1.0,
    }
}

pub fn incentive_code(level: IncentiveLevel) -> f64 {
    match level {
        IncentiveLevel::None => 0.0,
        IncentiveLevel::Low => 1.0,
        IncentiveLevel::Standard => 2.0,
        IncentiveLevel::High => 3.0,
    }
}

/// Encode a validated record into the model's feature vector.
pub fn encode(record: &ValidatedRecord) -> FeatureVector {
    let date = record.date();
    let month = date.month();
    let quarter = (month - 1) / 3 + 1;
    let weekday = date.weekday().number_from_monday();

    FeatureVector([
        f64::from(quarter),
        department_code(record.department()),
        f64::from(weekday),
        f64::from(record.team().number()),
        record.targeted_productivity(),
        record.smv_minutes(),
        // Overtime was fed to the model as whole hours.
        record.over_time_hours().trunc(),
        incentive_code(record.incentive_level()),
        record.idle_time_minutes(),
        f64::from(record.idle_men_count()),
        f64::from(record.style_change_count()),
        f64::from(record.worker_count()),
        f64::from(month),
    ])
}
