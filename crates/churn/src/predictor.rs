//! Predictor
//!
//! Binds a registry, its compiled pipeline and a classifier. Construction
//! fails when the three disagree, so a built predictor only ever fails on
//! bad records.

use crate::config::ChurnConfig;
use crate::error::Result;
use churn_pipeline::{FeaturePipeline, FeatureVector, PipelineError, RawRecord};
use churn_registry::EncoderRegistry;
use churn_scoring::{
    Classifier, DEFAULT_THRESHOLD, LogisticRegression, PredictionResult, ScoringError, score,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Encoded features together with the decision taken on them.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Feature vector handed to the classifier
    pub features: FeatureVector,
    /// Decision and probability
    pub result: PredictionResult,
}

/// Single-record churn predictor.
pub struct Predictor {
    pipeline: FeaturePipeline,
    classifier: Box<dyn Classifier>,
    threshold: f64,
}

impl Predictor {
    /// Compile the pipeline and check it against the classifier.
    ///
    /// # Errors
    /// - [`PipelineError::SchemaMismatch`] if the registry cannot be compiled,
    ///   or the classifier was trained on different column names.
    /// - [`ScoringError::DimensionMismatch`] if the classifier expects a
    ///   different number of columns.
    pub fn new(registry: Arc<EncoderRegistry>, classifier: Box<dyn Classifier>) -> Result<Self> {
        let pipeline = FeaturePipeline::new(registry)?;

        if classifier.expected_input_length() != pipeline.len() {
            return Err(ScoringError::DimensionMismatch {
                expected: classifier.expected_input_length(),
                actual: pipeline.len(),
            }
            .into());
        }
        if let Some(names) = classifier.feature_names()
            && names != pipeline.feature_names()
        {
            let first = names
                .iter()
                .zip(pipeline.feature_names())
                .position(|(model, registry)| model != registry)
                .unwrap_or(names.len().min(pipeline.len()));
            return Err(PipelineError::SchemaMismatch(format!(
                "classifier column {first} is {:?} but the registry encodes {:?}",
                names.get(first),
                pipeline.feature_names().get(first)
            ))
            .into());
        }

        info!(
            registry = pipeline.registry().name(),
            classifier = classifier.name(),
            features = pipeline.len(),
            "Predictor ready"
        );
        Ok(Self {
            pipeline,
            classifier,
            threshold: DEFAULT_THRESHOLD,
        })
    }

    /// Load registry and logistic model from the configured paths.
    pub fn from_config(config: &ChurnConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(EncoderRegistry::load(&config.registry_path)?);
        let model = LogisticRegression::load(&config.model_path)?;
        Self::new(registry, Box::new(model))?.with_threshold(config.threshold)
    }

    /// Use a non-default decision threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ScoringError::InvalidThreshold(threshold).into());
        }
        self.threshold = threshold;
        Ok(self)
    }

    /// Encode a record without scoring it.
    pub fn encode(&self, record: &RawRecord) -> Result<FeatureVector> {
        Ok(self.pipeline.encode(record)?)
    }

    /// Encode and score a record.
    pub fn predict(&self, record: &RawRecord) -> Result<PredictionResult> {
        Ok(self.explain(record)?.result)
    }

    /// Encode and score a record, keeping the encoded vector.
    pub fn explain(&self, record: &RawRecord) -> Result<Prediction> {
        let features = self.pipeline.encode(record)?;
        let result = score(&features, self.classifier.as_ref())?.with_threshold(self.threshold)?;
        debug!(
            probability = result.probability,
            churn = result.churn,
            threshold = self.threshold,
            "Predicted"
        );
        Ok(Prediction { features, result })
    }

    /// Compiled pipeline.
    pub const fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Loaded registry.
    pub fn registry(&self) -> &EncoderRegistry {
        self.pipeline.registry()
    }

    /// Classifier in use.
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Decision threshold.
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predictor")
            .field("registry", &self.pipeline.registry().name())
            .field("classifier", &self.classifier.name())
            .field("features", &self.pipeline.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use churn_pipeline::Attribute;
    use churn_registry::{FeatureDef, FrequencyTable, RegistryBuilder, ScaleParams, TenureTable};

    fn registry() -> Arc<EncoderRegistry> {
        Arc::new(
            RegistryBuilder::new("unit")
                .tenure_order(TenureTable::monthly())
                .frequency_table(
                    "REGION",
                    FrequencyTable::from_pairs([("DAKAR", 0.4), ("THIES", 0.1)]),
                )
                .scale("REGION_FE", ScaleParams::MinMax { min: 0.0, max: 0.4 })
                .scale("MONTANT", ScaleParams::Standard { mean: 5000.0, std: 2500.0 })
                .feature(FeatureDef::new("TENURE_OE", "ordinal", "TENURE"))
                .feature(FeatureDef::new("REGION_FE", "frequency", "REGION"))
                .feature(FeatureDef::new("MONTANT", "scaled", "MONTANT"))
                .build()
                .unwrap(),
        )
    }

    fn record() -> RawRecord {
        RawRecord::new()
            .with(Attribute::Tenure, "K > 24 month")
            .with(Attribute::Region, "DAKAR")
            .with(Attribute::Montant, 5000.0)
    }

    #[test]
    fn test_predict() {
        let model = LogisticRegression::new(vec![0.0, 0.0, 0.0], 0.0).unwrap();
        let predictor = Predictor::new(registry(), Box::new(model)).unwrap();
        let prediction = predictor.explain(&record()).unwrap();
        assert_eq!(prediction.features.values(), &[10.0, 1.0, 0.0]);
        assert_eq!(prediction.result.probability, 0.5);
        assert!(prediction.result.churn);

        let strict = predictor.with_threshold(0.6).unwrap();
        assert!(!strict.predict(&record()).unwrap().churn);
    }

    #[test]
    fn test_length_mismatch() {
        let model = LogisticRegression::new(vec![0.1; 4], 0.0).unwrap();
        assert!(matches!(
            Predictor::new(registry(), Box::new(model)),
            Err(Error::Scoring(ScoringError::DimensionMismatch { expected: 4, actual: 3 }))
        ));
    }

    #[test]
    fn test_name_mismatch() {
        let model = LogisticRegression::new(vec![0.1; 3], 0.0)
            .unwrap()
            .with_feature_names(vec!["TENURE_OE".into(), "MONTANT".into(), "REGION_FE".into()])
            .unwrap();
        match Predictor::new(registry(), Box::new(model)) {
            Err(Error::Pipeline(PipelineError::SchemaMismatch(msg))) => {
                assert!(msg.contains("column 1"));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_threshold() {
        let model = LogisticRegression::new(vec![0.0; 3], 0.0).unwrap();
        let predictor = Predictor::new(registry(), Box::new(model)).unwrap();
        assert!(predictor.with_threshold(-0.1).is_err());
    }
}
