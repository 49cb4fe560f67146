/// Domain error shared by every crate in the workspace.
///
/// Each variant maps to a stable machine-readable kind via [`CoreError::code`];
/// the `Display` output is the human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// One or more field-level violations, always the complete list.
    #[error("Invalid input data: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Not ready: {0}")]
    NotReady(String),

    /// A job claims to be complete but its artifact is gone.
    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    #[error("Source read error: {0}")]
    SourceRead(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable error kind for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotReady(_) => "NOT_READY",
            Self::MissingArtifact(_) => "MISSING_ARTIFACT",
            Self::SourceRead(_) => "SOURCE_READ_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Prediction(_) => "PREDICTION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_every_violation() {
        let err = CoreError::Validation(vec![
            "Date is required".to_string(),
            "Invalid department".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid input data: Date is required; Invalid department"
        );
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "BatchJob",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Entity not found: BatchJob with id abc");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
