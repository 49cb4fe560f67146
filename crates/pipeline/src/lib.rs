//! Batch scoring pipeline.
//!
//! [`manager::BatchJobManager`] owns the job lifecycle; [`source`] and
//! [`sink`] are the I/O seams for reading uploads and persisting results.

pub mod manager;
pub mod registry;
pub mod sink;
pub mod source;

pub use manager::{BatchJobManager, ManagerConfig};
pub use registry::JobRegistry;
pub use sink::{Artifact, CsvResultSink, ResultSink};
pub use source::{CsvSource, TabularSource};
