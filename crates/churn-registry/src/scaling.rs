//! Fitted scaling parameters.
//!
//! Standardisation: `(x - mean) / std`
//! Range normalisation: `(x - min) / (max - min)`
//!
//! A zero standard deviation or zero range divides by one instead, so a
//! constant training column maps to a constant offset rather than NaN.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};

/// Scaling statistics for one column, fitted on the training corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleParams {
    /// Standardisation with the training mean and standard deviation
    Standard {
        /// Training mean
        mean: f64,
        /// Training standard deviation
        std: f64,
    },
    /// Range normalisation with the training minimum and maximum
    MinMax {
        /// Training minimum
        min: f64,
        /// Training maximum
        max: f64,
    },
}

impl ScaleParams {
    /// Apply the fitted transform to a value.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Self::Standard { mean, std } => (value - mean) / non_zero(std),
            Self::MinMax { min, max } => (value - min) / non_zero(max - min),
        }
    }

    /// Fit standardisation statistics (population standard deviation).
    ///
    /// Returns `None` for an empty column.
    pub fn fit_standard(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self::Standard {
            mean,
            std: variance.sqrt(),
        })
    }

    /// Fit range normalisation statistics.
    ///
    /// Returns `None` for an empty column.
    pub fn fit_min_max(values: &[f64]) -> Option<Self> {
        let min = values.iter().copied().reduce(f64::min)?;
        let max = values.iter().copied().reduce(f64::max)?;
        Some(Self::MinMax { min, max })
    }

    /// Short name of the transform kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }

    /// Check that the statistics are usable.
    pub(crate) fn validate(&self, column: &str) -> Result<()> {
        match *self {
            Self::Standard { mean, std } => {
                if !mean.is_finite() || !std.is_finite() || std < 0.0 {
                    return Err(RegistryError::Invalid(format!(
                        "column {column}: standard scaling needs finite mean and std >= 0, got mean={mean}, std={std}"
                    )));
                }
            }
            Self::MinMax { min, max } => {
                if !min.is_finite() || !max.is_finite() || max < min {
                    return Err(RegistryError::Invalid(format!(
                        "column {column}: min_max scaling needs finite min <= max, got min={min}, max={max}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}
