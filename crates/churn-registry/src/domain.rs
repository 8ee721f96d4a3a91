//! Value domains offered to the form layer.

use serde::{Deserialize, Serialize};

/// Domain of values a source field took in the training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputDomain {
    /// Categorical options
    Categories {
        /// Observed category values
        values: Vec<String>,
    },
    /// Numeric range
    Range {
        /// Smallest observed value
        min: f64,
        /// Largest observed value
        max: f64,
    },
}

impl InputDomain {
    /// Midpoint of a numeric range.
    pub fn midpoint(&self) -> Option<f64> {
        match self {
            Self::Range { min, max } => Some((min + max) / 2.0),
            Self::Categories { .. } => None,
        }
    }

    /// First categorical option.
    pub fn first_category(&self) -> Option<&str> {
        match self {
            Self::Categories { values } => values.first().map(String::as_str),
            Self::Range { .. } => None,
        }
    }
}
