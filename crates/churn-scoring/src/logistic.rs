//! Logistic regression classifier
//!
//! Scores with the coefficients exported from training:
//! P(churn | x) = 1 / (1 + exp(-(w · x + b)))

use crate::classifier::Classifier;
use crate::error::{Result, ScoringError};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// On-disk form of a logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticArtifact {
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

/// Fitted binary logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coefficients: Array1<f64>,
    intercept: f64,
    feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    /// Build a model from coefficients and intercept.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        Self::from_artifact(LogisticArtifact {
            coefficients,
            intercept,
            feature_names: None,
        })
    }

    /// Attach the training column names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.coefficients.len() {
            return Err(ScoringError::InvalidModel(format!(
                "{} feature names for {} coefficients",
                names.len(),
                self.coefficients.len()
            )));
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    /// Load a model artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScoringError::ModelIo {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            features = model.coefficients.len(),
            "Loaded logistic regression model"
        );
        Ok(model)
    }

    /// Deserialize a model artifact from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_artifact(serde_json::from_reader(reader)?)
    }

    /// Serialize the model artifact as JSON.
    pub fn to_json_string(&self) -> Result<String> {
        let artifact = LogisticArtifact {
            coefficients: self.coefficients.to_vec(),
            intercept: self.intercept,
            feature_names: self.feature_names.clone(),
        };
        Ok(serde_json::to_string_pretty(&artifact)?)
    }

    fn from_artifact(artifact: LogisticArtifact) -> Result<Self> {
        if artifact.coefficients.is_empty() {
            return Err(ScoringError::InvalidModel("no coefficients".to_string()));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|c| !c.is_finite())
        {
            return Err(ScoringError::InvalidModel(
                "coefficients and intercept must be finite".to_string(),
            ));
        }
        let model = Self {
            coefficients: Array1::from_vec(artifact.coefficients),
            intercept: artifact.intercept,
            feature_names: None,
        };
        match artifact.feature_names {
            Some(names) => model.with_feature_names(names),
            None => Ok(model),
        }
    }

    /// Linear score `w · x + b`.
    ///
    /// NaN when `features` does not have one value per coefficient.
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        if features.len() != self.coefficients.len() {
            return f64::NAN;
        }
        self.coefficients.dot(&ArrayView1::from(features)) + self.intercept
    }

    /// Fitted coefficients.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Fitted intercept.
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn expected_input_length(&self) -> usize {
        self.coefficients.len()
    }

    fn probability_of_positive_class(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision_function(features))
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

fn sigmoid(z: f64) -> f64 {
    // Split on sign so exp never overflows.
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
