use crate::store::StoreError;

/// Represents the different types of errors that can occur in the tag classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The counts needed to classify could not be read from the store
    #[error("Failed to load classifier index: {0}")]
    IndexLoadFailure(#[source] StoreError),
    /// One tag could not be scored
    #[error("Failed to score tag '{tag}': {reason}")]
    ScoringFailure { tag: String, reason: String },
    /// Training failed and its writes were rolled back
    #[error("Failed to train document: {0}")]
    TrainFailure(String),
    /// Untraining failed and its writes were rolled back
    #[error("Failed to untrain document: {0}")]
    UntrainFailure(String),
    /// Invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Unreadable or malformed configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClassifierError {
    pub(crate) fn scoring(tag: &str, reason: impl Into<String>) -> Self {
        ClassifierError::ScoringFailure {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}
