//! Error types for the churn facade.

use churn_pipeline::PipelineError;
use churn_registry::RegistryError;
use churn_scoring::ScoringError;
use thiserror::Error;

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the predictor, configuration, batch and fitting layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Registry could not be loaded or queried
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Record could not be encoded, or registry and pipeline disagree
    #[error("Encoding error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Vector could not be scored, or the model could not be loaded
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Configuration sources could not be merged or extracted
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV input or output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Training corpus or layout cannot produce a registry
    #[error("Fit error: {0}")]
    Fit(String),

    /// Output could not be rendered
    #[error("Export error: {0}")]
    Export(String),
}
