//! Error types for scoring.

use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors that can occur while loading a classifier or scoring a vector.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Vector length differs from the classifier's input length
    #[error("Dimension mismatch: classifier expects {expected} features, got {actual}")]
    DimensionMismatch {
        /// Classifier input length
        expected: usize,
        /// Length of the supplied vector
        actual: usize,
    },

    /// Classifier returned something that is not a probability
    #[error("Classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),

    /// Decision threshold outside [0, 1]
    #[error("Invalid decision threshold: {0} (must be between 0 and 1)")]
    InvalidThreshold(f64),

    /// Model artifact could not be read
    #[error("Failed to read model at {path}: {source}")]
    ModelIo {
        /// Path of the artifact
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Model artifact is malformed
    #[error("Malformed model artifact: {0}")]
    MalformedModel(#[from] serde_json::Error),

    /// Model artifact parsed but is unusable
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
