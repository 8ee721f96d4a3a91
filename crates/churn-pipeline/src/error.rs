//! Error types for feature encoding.

use crate::attribute::{Attribute, AttributeKind};
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while compiling a pipeline or encoding a record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required field is absent from the record
    #[error("Missing required field: {0}")]
    MissingField(Attribute),

    /// A field carries the wrong kind of value
    #[error("Field {field} expects a {expected} value")]
    InvalidFieldType {
        /// Offending field
        field: Attribute,
        /// Kind the field requires
        expected: AttributeKind,
    },

    /// A textual value could not be interpreted for its field
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue {
        /// Offending field
        field: Attribute,
        /// Raw text supplied
        value: String,
    },

    /// A field name outside the record vocabulary
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A `KEY=VALUE` assignment without the `=`
    #[error("Malformed assignment {0:?}, expected KEY=VALUE")]
    MalformedAssignment(String),

    /// A record could not be parsed from JSON
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    /// The registry and this pipeline build disagree on the feature layout
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl PipelineError {
    /// Whether the error is a problem with the request rather than the deployment.
    pub const fn is_request_error(&self) -> bool {
        !matches!(self, Self::SchemaMismatch(_))
    }
}
