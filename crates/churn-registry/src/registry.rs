//! Encoder Registry
//!
//! Read-only store of everything needed to reproduce training-time encodings
//! at inference time. A registry is fitted once, persisted as JSON, and loaded
//! once per process; it is safe to share across threads without locking.

use crate::domain::InputDomain;
use crate::error::{RegistryError, Result};
use crate::feature::FeatureDef;
use crate::frequency::FrequencyTable;
use crate::scaling::ScaleParams;
use crate::tenure::TenureTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Layout version written by this crate.
pub const REGISTRY_SCHEMA_VERSION: u32 = 1;

/// Rank assigned to tenure labels outside the registry's vocabulary.
pub const FALLBACK_TENURE_RANK: u32 = 0;

/// Fitted encoder parameters for one deployed classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderRegistry {
    schema_version: u32,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fitted_at: Option<DateTime<Utc>>,
    tenure_order: TenureTable,
    #[serde(default)]
    category_frequency: BTreeMap<String, FrequencyTable>,
    #[serde(default)]
    scale_params: BTreeMap<String, ScaleParams>,
    feature_order: Vec<FeatureDef>,
    #[serde(default)]
    optional_fields: BTreeSet<String>,
    #[serde(default)]
    input_domain: BTreeMap<String, InputDomain>,
}

impl EncoderRegistry {
    /// Load a registry artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            name = %registry.name,
            schema_version = registry.schema_version,
            features = registry.feature_order.len(),
            "Loaded encoder registry"
        );
        Ok(registry)
    }

    /// Deserialize and validate a registry from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let registry: Self = serde_json::from_reader(reader)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Deserialize and validate a registry from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Write the registry as pretty-printed JSON.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Persist the registry to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// Ordinal code for a tenure label.
    ///
    /// Labels outside the vocabulary fall back to [`FALLBACK_TENURE_RANK`].
    pub fn tenure_rank(&self, label: &str) -> u32 {
        self.tenure_order.rank(label).unwrap_or_else(|| {
            debug!(label, "Unknown tenure label, using fallback rank");
            FALLBACK_TENURE_RANK
        })
    }

    /// Training-time frequency of `value` in column `column`.
    ///
    /// Unseen values, and columns without a table, yield `0.0`.
    pub fn category_frequency(&self, column: &str, value: &str) -> f64 {
        let Some(table) = self.category_frequency.get(column) else {
            return crate::frequency::UNSEEN_FREQUENCY;
        };
        table.get(value).unwrap_or_else(|| {
            debug!(column, value, "Unseen category, encoding as zero frequency");
            crate::frequency::UNSEEN_FREQUENCY
        })
    }

    /// Apply the fitted scaling for `column` to `value`.
    pub fn scale(&self, column: &str, value: f64) -> Result<f64> {
        self.scale_params(column)
            .map(|params| params.apply(value))
            .ok_or_else(|| RegistryError::UnknownColumn(column.to_string()))
    }

    /// Fitted scaling parameters for a column.
    pub fn scale_params(&self, column: &str) -> Option<&ScaleParams> {
        self.scale_params.get(column)
    }

    /// Whether a frequency table was fitted for the column.
    pub fn has_frequency_table(&self, column: &str) -> bool {
        self.category_frequency.contains_key(column)
    }

    /// Frequency table for a column.
    pub fn frequency_table(&self, column: &str) -> Option<&FrequencyTable> {
        self.category_frequency.get(column)
    }

    /// Tenure ordinal table.
    pub const fn tenure_table(&self) -> &TenureTable {
        &self.tenure_order
    }

    /// Ordered feature definitions the classifier expects.
    pub fn feature_order(&self) -> &[FeatureDef] {
        &self.feature_order
    }

    /// Feature names in classifier order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.feature_order.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether a record may omit the field.
    pub fn is_optional(&self, field: &str) -> bool {
        self.optional_fields.contains(field)
    }

    /// Fields a record may omit.
    pub fn optional_fields(&self) -> impl Iterator<Item = &str> {
        self.optional_fields.iter().map(String::as_str)
    }

    /// Value domain of a source field, if recorded.
    pub fn input_domain(&self, field: &str) -> Option<&InputDomain> {
        self.input_domain.get(field)
    }

    /// Layout version of the artifact.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Registry name, usually the classifier it was fitted for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the registry was fitted.
    pub const fn fitted_at(&self) -> Option<DateTime<Utc>> {
        self.fitted_at
    }

    fn validate(&self) -> Result<()> {
        if self.feature_order.is_empty() {
            return Err(RegistryError::Invalid("feature_order is empty".to_string()));
        }
        if self.tenure_order.is_empty() {
            return Err(RegistryError::Invalid("tenure_order is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for feature in &self.feature_order {
            if !seen.insert(feature.name.as_str()) {
                return Err(RegistryError::Invalid(format!(
                    "duplicate feature name: {}",
                    feature.name
                )));
            }
        }

        for (column, params) in &self.scale_params {
            params.validate(column)?;
        }

        for (column, table) in &self.category_frequency {
            if let Some((category, freq)) = table.iter().find(|(_, f)| !f.is_finite() || *f < 0.0)
            {
                return Err(RegistryError::Invalid(format!(
                    "column {column}: frequency for {category} must be finite and >= 0, got {freq}"
                )));
            }
        }

        for (field, domain) in &self.input_domain {
            if let InputDomain::Range { min, max } = domain
                && max < min
            {
                return Err(RegistryError::Invalid(format!(
                    "input domain for {field}: max {max} is below min {min}"
                )));
            }
        }

        Ok(())
    }
}

/// Incremental constructor for an [`EncoderRegistry`].
///
/// Used by fitting tools and tests; inference code loads artifacts instead.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    registry: EncoderRegistry,
}

impl RegistryBuilder {
    /// Start a registry with the current schema version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            registry: EncoderRegistry {
                schema_version: REGISTRY_SCHEMA_VERSION,
                name: name.into(),
                fitted_at: None,
                tenure_order: TenureTable::default(),
                category_frequency: BTreeMap::new(),
                scale_params: BTreeMap::new(),
                feature_order: Vec::new(),
                optional_fields: BTreeSet::new(),
                input_domain: BTreeMap::new(),
            },
        }
    }

    /// Override the schema version.
    pub const fn schema_version(mut self, version: u32) -> Self {
        self.registry.schema_version = version;
        self
    }

    /// Record the fit timestamp.
    pub const fn fitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.registry.fitted_at = Some(at);
        self
    }

    /// Set the tenure table.
    pub fn tenure_order(mut self, table: TenureTable) -> Self {
        self.registry.tenure_order = table;
        self
    }

    /// Add a frequency table for a categorical column.
    pub fn frequency_table(mut self, column: impl Into<String>, table: FrequencyTable) -> Self {
        self.registry.category_frequency.insert(column.into(), table);
        self
    }

    /// Add scaling parameters for a column.
    pub fn scale(mut self, column: impl Into<String>, params: ScaleParams) -> Self {
        self.registry.scale_params.insert(column.into(), params);
        self
    }

    /// Append a feature to the classifier input order.
    pub fn feature(mut self, feature: FeatureDef) -> Self {
        self.registry.feature_order.push(feature);
        self
    }

    /// Declare a source field optional.
    pub fn optional(mut self, field: impl Into<String>) -> Self {
        self.registry.optional_fields.insert(field.into());
        self
    }

    /// Record the value domain of a source field.
    pub fn input_domain(mut self, field: impl Into<String>, domain: InputDomain) -> Self {
        self.registry.input_domain.insert(field.into(), domain);
        self
    }

    /// Validate and finish the registry.
    pub fn build(self) -> Result<EncoderRegistry> {
        self.registry.validate()?;
        Ok(self.registry)
    }
}
