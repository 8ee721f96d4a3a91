//! Prediction results.

use crate::error::{Result, ScoringError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default decision boundary on the churn probability.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Outcome of scoring one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Whether the customer is predicted to churn at the default boundary
    pub churn: bool,
    /// Probability of churn, in [0, 1]
    pub probability: f64,
}

impl PredictionResult {
    /// Build a result from a validated probability.
    pub fn from_probability(probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::InvalidProbability(probability));
        }
        Ok(Self {
            churn: probability >= DEFAULT_THRESHOLD,
            probability,
        })
    }

    /// Re-decide churn at a caller-chosen threshold.
    pub fn with_threshold(self, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ScoringError::InvalidThreshold(threshold));
        }
        Ok(Self {
            churn: self.probability >= threshold,
            ..self
        })
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.churn { "Churn" } else { "Not churn" };
        write!(f, "{label} (probability {:.2}%)", self.probability * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, false)]
    #[case(0.4999, false)]
    #[case(0.5, true)]
    #[case(1.0, true)]
    fn test_default_boundary(#[case] probability: f64, #[case] churn: bool) {
        let result = PredictionResult::from_probability(probability).unwrap();
        assert_eq!(result.churn, churn);
        assert_eq!(result.churn, result.probability >= 0.5);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(1.01)]
    #[case(f64::NAN)]
    fn test_rejects_non_probability(#[case] probability: f64) {
        assert!(matches!(
            PredictionResult::from_probability(probability),
            Err(ScoringError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_with_threshold() {
        let result = PredictionResult::from_probability(0.35).unwrap();
        assert!(!result.churn);
        let lenient = result.with_threshold(0.3).unwrap();
        assert!(lenient.churn);
        assert_eq!(lenient.probability, 0.35);
        assert!(result.with_threshold(1.5).is_err());
    }

    #[test]
    fn test_display() {
        let result = PredictionResult::from_probability(0.7342).unwrap();
        assert_eq!(result.to_string(), "Churn (probability 73.42%)");
    }
}
