/// Batch jobs are keyed by a random UUID.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// One loosely-typed input record: field name to string/number value,
/// as received from a JSON body or a CSV row.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;
