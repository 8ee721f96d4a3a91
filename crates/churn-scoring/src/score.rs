//! Scoring Interface
//!
//! The length check here is the last guard against a pipeline/model pairing
//! that would otherwise produce a silently wrong prediction.

use crate::classifier::Classifier;
use crate::error::{Result, ScoringError};
use crate::result::PredictionResult;
use churn_pipeline::FeatureVector;
use tracing::debug;

/// Score an encoded vector with a classifier.
///
/// # Errors
/// - [`ScoringError::DimensionMismatch`] if the vector length differs from
///   the classifier's expected input length.
/// - [`ScoringError::InvalidProbability`] if the classifier output is not in [0, 1].
pub fn score<C>(vector: &FeatureVector, classifier: &C) -> Result<PredictionResult>
where
    C: Classifier + ?Sized,
{
    score_values(vector.values(), classifier)
}

/// Score a bare slice of encoded values.
pub fn score_values<C>(values: &[f64], classifier: &C) -> Result<PredictionResult>
where
    C: Classifier + ?Sized,
{
    let expected = classifier.expected_input_length();
    if values.len() != expected {
        return Err(ScoringError::DimensionMismatch {
            expected,
            actual: values.len(),
        });
    }

    let probability = classifier.probability_of_positive_class(values);
    let result = PredictionResult::from_probability(probability)?;
    debug!(
        classifier = classifier.name(),
        probability = result.probability,
        churn = result.churn,
        "Scored feature vector"
    );
    Ok(result)
}
