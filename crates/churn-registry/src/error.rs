//! Error types for registry operations.

use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while loading or querying an encoder registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry artifact could not be read
    #[error("Failed to read registry at {path}: {source}")]
    Io {
        /// Path of the artifact
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Registry artifact is not valid JSON or does not match the layout
    #[error("Malformed registry artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Registry artifact parsed but its contents are inconsistent
    #[error("Invalid registry: {0}")]
    Invalid(String),

    /// No scaling parameters are stored for the column
    #[error("No scaling parameters for column: {0}")]
    UnknownColumn(String),
}

impl RegistryError {
    /// Whether the error means the artifact itself could not be loaded.
    ///
    /// These are fatal at startup: nothing can be scored without a registry.
    pub const fn is_load_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Malformed(_) | Self::Invalid(_))
    }
}
