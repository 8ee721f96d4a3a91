#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/expresso-analytics/churn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod attribute;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod transform;
pub mod vector;

pub use attribute::{Attribute, AttributeKind};
pub use error::{PipelineError, Result};
pub use pipeline::{FeaturePipeline, PIPELINE_SCHEMA_VERSION, encode};
pub use record::{AttributeValue, RawRecord};
pub use transform::Transform;
pub use vector::FeatureVector;
