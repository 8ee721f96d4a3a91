#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/expresso-analytics/churn/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod feature;
pub mod frequency;
pub mod registry;
pub mod scaling;
pub mod tenure;

pub use domain::InputDomain;
pub use error::{RegistryError, Result};
pub use feature::FeatureDef;
pub use frequency::FrequencyTable;
pub use registry::{EncoderRegistry, FALLBACK_TENURE_RANK, REGISTRY_SCHEMA_VERSION, RegistryBuilder};
pub use scaling::ScaleParams;
pub use tenure::TenureTable;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
