//! Record validation engine.
//!
//! Field specs and bounds live in [`rules`]; [`evaluator`] turns a
//! [`RawRecord`](crate::types::RawRecord) into a
//! [`ValidatedRecord`](crate::record::ValidatedRecord) or the full list of
//! violations. Pure logic, no I/O.

pub mod evaluator;
pub mod rules;

pub use evaluator::{parse_team, validate_record, validate_record_on};
