//! Persisted feature definitions.

use serde::{Deserialize, Serialize};

/// One column of the classifier's input vector, as stored in the registry.
///
/// `transform` is kept as free text: the pipeline that consumes the registry
/// decides which transforms it implements and rejects the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    /// Column name the classifier was trained with
    pub name: String,
    /// Transform kind (`ordinal`, `frequency`, `one_hot`, `scaled`)
    pub transform: String,
    /// Record field the column is derived from
    pub source: String,
    /// Category matched by a `one_hot` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl FeatureDef {
    /// Create a feature definition.
    pub fn new(
        name: impl Into<String>,
        transform: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            transform: transform.into(),
            source: source.into(),
            category: None,
        }
    }

    /// Create a `one_hot` feature definition for a category.
    pub fn one_hot(
        name: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::new(name, "one_hot", source)
        }
    }
}
