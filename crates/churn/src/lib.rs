#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/expresso-analytics/churn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod fit;
pub mod predictor;

// Re-export main types from sub-crates
pub use churn_pipeline as pipeline;
pub use churn_registry as registry;
pub use churn_scoring as scoring;

pub use churn_pipeline::{Attribute, FeaturePipeline, FeatureVector, RawRecord};
pub use churn_registry::EncoderRegistry;
pub use churn_scoring::{Classifier, LogisticRegression, PredictionResult};

pub use config::ChurnConfig;
pub use error::{Error, Result};
pub use predictor::{Prediction, Predictor};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
