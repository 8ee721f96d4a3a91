#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/expresso-analytics/churn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod classifier;
pub mod error;
pub mod logistic;
pub mod result;
pub mod score;

pub use classifier::Classifier;
pub use error::{Result, ScoringError};
pub use logistic::LogisticRegression;
pub use result::{DEFAULT_THRESHOLD, PredictionResult};
pub use score::{score, score_values};
