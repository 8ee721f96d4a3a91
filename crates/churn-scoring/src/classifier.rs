//! Classifier trait.
//!
//! The trained model is opaque to this workspace. Implementations adapt
//! whatever they wrap to these two operations.

use crate::result::DEFAULT_THRESHOLD;

/// A binary classifier over fixed-length feature vectors.
pub trait Classifier: Send + Sync {
    /// Number of features the classifier was trained on.
    fn expected_input_length(&self) -> usize;

    /// Probability of the positive (churn) class, in [0, 1].
    ///
    /// Implementations return NaN rather than panic when
    /// `features.len() != self.expected_input_length()`.
    fn probability_of_positive_class(&self, features: &[f64]) -> f64;

    /// Hard prediction at the default decision boundary.
    fn predict(&self, features: &[f64]) -> bool {
        self.probability_of_positive_class(features) >= DEFAULT_THRESHOLD
    }

    /// Column names the classifier was trained with, when known.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Human readable name for logs.
    fn name(&self) -> &str {
        "classifier"
    }
}
