//! Domain logic for the productivity scoring service.
//!
//! Everything here is pure apart from reading the model artifact: record
//! validation, feature encoding, scoring, classification, charts and the
//! per-row batch step.

pub mod batch;
pub mod category;
pub mod error;
pub mod features;
pub mod meta;
pub mod prediction;
pub mod record;
pub mod scoring;
pub mod types;
pub mod validation;
pub mod visualization;
