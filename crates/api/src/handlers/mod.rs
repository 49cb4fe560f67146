pub mod batch;
pub mod meta;
pub mod scoring;
