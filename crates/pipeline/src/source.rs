//! Tabular batch sources.

use std::path::Path;

use async_trait::async_trait;
use prodscore_core::error::CoreError;
use prodscore_core::types::RawRecord;
use serde_json::Value;

/// Reads an uploaded source into ordered raw records.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<RawRecord>, CoreError>;
}

/// CSV with a header row; one record per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSource;

#[async_trait]
impl TabularSource for CsvSource {
    async fn read(&self, path: &Path) -> Result<Vec<RawRecord>, CoreError> {
        // The path stays in the log; job errors are shown to clients.
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read batch source");
            CoreError::SourceRead(e.to_string())
        })?;
        parse_csv(&bytes)
    }
}

/// Parse CSV bytes into raw records keyed by header name.
///
/// Cells keep their text; empty cells become `null` so the validator treats
/// them as missing. A ragged row fails the whole read.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRecord>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| CoreError::SourceRead(e.to_string()))?
        .clone();
    if headers.iter().all(str::is_empty) {
        return Err(CoreError::SourceRead("no columns to parse".to_string()));
    }

    reader
        .records()
        .map(|row| {
            let row = row.map_err(|e| CoreError::SourceRead(e.to_string()))?;
            let record: RawRecord = headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| {
                    let value = if cell.trim().is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_string())
                    };
                    (name.to_string(), value)
                })
                .collect();
            Ok(record)
        })
        .collect()
}
