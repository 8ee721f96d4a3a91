//! Registry fitting.
//!
//! Fits the encoder parameters a registry carries from a training CSV and a
//! layout that names the classifier columns. Every statistic is computed once
//! over the whole corpus; empty cells are left out of every statistic.
//! The classifier itself is trained elsewhere.

use crate::error::{Error, Result};
use chrono::Utc;
use churn_pipeline::{Attribute, AttributeKind, FeaturePipeline, Transform};
use churn_registry::{
    EncoderRegistry, FeatureDef, FrequencyTable, InputDomain, RegistryBuilder, ScaleParams,
    TenureTable,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Tenure vocabulary the registry is fitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenureScheme {
    /// Eleven monthly buckets
    Monthly,
    /// Nine ranks over quarterly buckets
    Quarterly,
    /// Explicit label to rank table
    Custom(TenureTable),
}

impl TenureScheme {
    fn table(&self) -> TenureTable {
        match self {
            Self::Monthly => TenureTable::monthly(),
            Self::Quarterly => TenureTable::quarterly(),
            Self::Custom(table) => table.clone(),
        }
    }
}

/// What a frequency table stores per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// Share of non-empty training rows
    #[default]
    Proportions,
    /// Raw occurrence count
    Counts,
}

/// Scaler fitted for a `scaled` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingKind {
    /// Mean and population standard deviation
    #[default]
    Standard,
    /// Observed minimum and maximum
    MinMax,
}

/// One classifier column in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFeature {
    /// Column name the classifier is trained with
    pub name: String,
    /// Transform kind
    pub transform: Transform,
    /// Source attribute
    pub source: Attribute,
    /// Category for `one_hot` columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Scaler for `scaled` columns
    #[serde(default)]
    pub scaling: ScalingKind,
}

impl LayoutFeature {
    /// Registry column for this feature.
    ///
    /// A category is required for `one_hot` and rejected for every other
    /// transform.
    fn def(&self) -> Result<FeatureDef> {
        match (self.transform, &self.category) {
            (Transform::OneHot, Some(category)) => Ok(FeatureDef::one_hot(
                &self.name,
                self.source.as_str(),
                category,
            )),
            (Transform::OneHot, None) => Err(Error::Fit(format!(
                "feature {}: one_hot columns need a category",
                self.name
            ))),
            (transform, Some(_)) => Err(Error::Fit(format!(
                "feature {}: category is only valid for one_hot columns, not {transform}",
                self.name
            ))),
            (transform, None) => Ok(FeatureDef::new(
                &self.name,
                transform.as_str(),
                self.source.as_str(),
            )),
        }
    }
}

/// Description of the registry to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitLayout {
    /// Registry name
    pub name: String,
    /// Tenure vocabulary
    pub tenure: TenureScheme,
    /// Frequency table contents
    #[serde(default)]
    pub frequency: FrequencyMode,
    /// Classifier columns in order
    pub features: Vec<LayoutFeature>,
    /// Source fields that may be absent at inference
    #[serde(default)]
    pub optional_fields: Vec<Attribute>,
}

impl FitLayout {
    /// Load a layout from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn feature_sources(&self) -> BTreeSet<Attribute> {
        self.features.iter().map(|f| f.source).collect()
    }
}

/// Training rows held as text.
struct Corpus {
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl Corpus {
    fn read<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    fn has_column(&self, field: Attribute) -> bool {
        self.headers.iter().any(|h| h == field.as_str())
    }

    /// Non-empty cells of a column with their 1-based row numbers.
    fn cells(&self, field: Attribute) -> Result<Vec<(usize, &str)>> {
        let index = self
            .headers
            .iter()
            .position(|h| h == field.as_str())
            .ok_or_else(|| Error::Fit(format!("training data has no {field} column")))?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(index).map(|cell| (i + 1, cell)))
            .filter(|(_, cell)| !cell.is_empty())
            .collect())
    }

    fn categories(&self, field: Attribute) -> Result<Vec<&str>> {
        Ok(self.cells(field)?.into_iter().map(|(_, cell)| cell).collect())
    }

    fn numbers(&self, field: Attribute) -> Result<Vec<f64>> {
        self.cells(field)?
            .into_iter()
            .map(|(row, cell)| {
                cell.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| Error::Fit(format!("{field} row {row}: {cell:?} is not a number")))
            })
            .collect()
    }
}

/// Fit a registry from a layout and a training CSV.
///
/// The result is compiled into a [`FeaturePipeline`] before it is returned,
/// so a fitted registry always encodes.
pub fn fit_registry<R: Read>(layout: &FitLayout, training: R) -> Result<EncoderRegistry> {
    let corpus = Corpus::read(training)?;
    if corpus.rows.is_empty() {
        return Err(Error::Fit("training data has no rows".to_string()));
    }

    let defs = layout
        .features
        .iter()
        .map(LayoutFeature::def)
        .collect::<Result<Vec<_>>>()?;

    let tenure = layout.tenure.table();
    let mut builder = RegistryBuilder::new(layout.name.clone())
        .fitted_at(Utc::now())
        .tenure_order(tenure.clone());
    let mut tables: BTreeMap<Attribute, FrequencyTable> = BTreeMap::new();

    for (feature, def) in layout.features.iter().zip(defs) {
        match feature.transform {
            Transform::Frequency => {
                if !tables.contains_key(&feature.source) {
                    let values = corpus.categories(feature.source)?;
                    let table = match layout.frequency {
                        FrequencyMode::Proportions => FrequencyTable::fit_proportions(values),
                        FrequencyMode::Counts => FrequencyTable::fit_counts(values),
                    };
                    tables.insert(feature.source, table);
                }
                let table = &tables[&feature.source];
                let (Some(min), Some(max)) = (table.min(), table.max()) else {
                    return Err(Error::Fit(format!("{} has no values", feature.source)));
                };
                builder = builder.scale(feature.name.clone(), ScaleParams::MinMax { min, max });
            }
            Transform::Scaled => {
                let values = corpus.numbers(feature.source)?;
                let params = match feature.scaling {
                    ScalingKind::Standard => ScaleParams::fit_standard(&values),
                    ScalingKind::MinMax => ScaleParams::fit_min_max(&values),
                }
                .ok_or_else(|| Error::Fit(format!("{} has no values", feature.source)))?;
                builder = builder.scale(feature.name.clone(), params);
            }
            Transform::Ordinal | Transform::OneHot => {}
        }

        builder = builder.feature(def);
    }

    for (source, table) in tables {
        builder = builder.frequency_table(source.as_str(), table);
    }
    for field in &layout.optional_fields {
        builder = builder.optional(field.as_str());
    }
    // Optional fields may be absent from training data; feature sources may not.
    let mut domains = layout.feature_sources();
    domains.extend(
        layout
            .optional_fields
            .iter()
            .copied()
            .filter(|field| corpus.has_column(*field)),
    );
    for field in domains {
        if let Some(domain) = input_domain(&corpus, field, &tenure)? {
            builder = builder.input_domain(field.as_str(), domain);
        }
    }

    let registry = builder.build()?;
    FeaturePipeline::new(Arc::new(registry.clone()))?;
    info!(
        name = registry.name(),
        rows = corpus.rows.len(),
        features = registry.feature_order().len(),
        "Fitted encoder registry"
    );
    Ok(registry)
}

/// Fit a registry from files.
pub fn fit_registry_from_paths(
    layout: impl AsRef<Path>,
    training: impl AsRef<Path>,
) -> Result<EncoderRegistry> {
    let layout = FitLayout::load(layout)?;
    fit_registry(&layout, BufReader::new(File::open(training)?))
}

/// Observed domain of a source field.
///
/// Categories are listed most frequent first, tenure labels by rank.
fn input_domain(
    corpus: &Corpus,
    field: Attribute,
    tenure: &TenureTable,
) -> Result<Option<InputDomain>> {
    match field.kind() {
        AttributeKind::Numeric => {
            let values = corpus.numbers(field)?;
            Ok(values
                .iter()
                .copied()
                .reduce(f64::min)
                .zip(values.iter().copied().reduce(f64::max))
                .map(|(min, max)| InputDomain::Range { min, max }))
        }
        AttributeKind::Categorical => {
            let counts = FrequencyTable::fit_counts(corpus.categories(field)?);
            if counts.is_empty() {
                return Ok(None);
            }
            let mut values: Vec<(&str, f64)> = counts.iter().collect();
            if field == Attribute::Tenure {
                values.sort_by_key(|(label, _)| tenure.rank(label).unwrap_or(u32::MAX));
            } else {
                values.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            }
            Ok(Some(InputDomain::Categories {
                values: values.into_iter().map(|(v, _)| v.to_string()).collect(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRAINING: &str = "\
user_id,REGION,TENURE,MONTANT,TOP_PACK,CHURN
u1,DAKAR,K > 24 month,1000,On net 200F,0
u2,DAKAR,K > 24 month,3000,,0
u3,THIES,I 18-21 month,,On net 200F,1
u4,,C 6-9 month,2000,Data 490F,0
";

    fn layout() -> FitLayout {
        serde_json::from_str(
            r#"{
                "name": "unit",
                "tenure": "quarterly",
                "features": [
                    {"name": "REGION_FE", "transform": "frequency", "source": "REGION"},
                    {"name": "TENURE", "transform": "ordinal", "source": "TENURE"},
                    {"name": "MONTANT", "transform": "scaled", "source": "MONTANT"},
                    {"name": "TOP_PACK_DATA", "transform": "one_hot", "source": "TOP_PACK",
                     "category": "Data 490F"}
                ],
                "optional_fields": ["TOP_PACK"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_fit_registry() {
        let registry = fit_registry(&layout(), TRAINING.as_bytes()).unwrap();
        assert_eq!(registry.name(), "unit");
        assert!(registry.fitted_at().is_some());
        assert_eq!(
            registry.feature_names(),
            vec!["REGION_FE", "TENURE", "MONTANT", "TOP_PACK_DATA"]
        );

        assert_relative_eq!(registry.category_frequency("REGION", "DAKAR"), 2.0 / 3.0);
        assert_relative_eq!(registry.category_frequency("REGION", "THIES"), 1.0 / 3.0);
        assert_eq!(
            registry.scale_params("REGION_FE"),
            Some(&ScaleParams::MinMax {
                min: 1.0 / 3.0,
                max: 2.0 / 3.0
            })
        );

        match registry.scale_params("MONTANT") {
            Some(ScaleParams::Standard { mean, std }) => {
                assert_relative_eq!(*mean, 2000.0);
                assert_relative_eq!(*std, (2.0f64 / 3.0).sqrt() * 1000.0, epsilon = 1e-9);
            }
            other => panic!("expected standard scaling, got {other:?}"),
        }

        assert!(registry.is_optional("TOP_PACK"));
        assert_eq!(
            registry.input_domain("MONTANT"),
            Some(&InputDomain::Range {
                min: 1000.0,
                max: 3000.0
            })
        );
        assert_eq!(
            registry.input_domain("TENURE").and_then(InputDomain::first_category),
            Some("C 6-9 month")
        );
        assert_eq!(
            registry.input_domain("REGION").and_then(InputDomain::first_category),
            Some("DAKAR")
        );
    }

    #[test]
    fn test_counts_mode() {
        let mut layout = layout();
        layout.frequency = FrequencyMode::Counts;
        let registry = fit_registry(&layout, TRAINING.as_bytes()).unwrap();
        assert_eq!(registry.category_frequency("REGION", "DAKAR"), 2.0);
    }

    #[test]
    fn test_missing_column() {
        let training = "REGION,TENURE\nDAKAR,K > 24 month\n";
        assert!(matches!(
            fit_registry(&layout(), training.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("MONTANT")
        ));
    }

    #[test]
    fn test_bad_number() {
        let training = TRAINING.replace("3000", "n/a");
        assert!(matches!(
            fit_registry(&layout(), training.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("row 2")
        ));
    }

    #[test]
    fn test_category_on_frequency_column() {
        let mut layout = layout();
        layout.features[0].category = Some("DAKAR".to_string());
        assert!(matches!(
            fit_registry(&layout, TRAINING.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("REGION_FE") && msg.contains("frequency")
        ));
    }

    #[test]
    fn test_category_on_scaled_column() {
        let mut layout = layout();
        layout.features[2].category = Some("1000".to_string());
        assert!(matches!(
            fit_registry(&layout, TRAINING.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("MONTANT") && msg.contains("scaled")
        ));
    }

    #[test]
    fn test_one_hot_without_category() {
        let mut layout = layout();
        layout.features[3].category = None;
        assert!(matches!(
            fit_registry(&layout, TRAINING.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("TOP_PACK_DATA")
        ));
    }

    #[test]
    fn test_optional_column_absent() {
        let mut layout = layout();
        layout.features.truncate(3);
        let training = "\
REGION,TENURE,MONTANT
DAKAR,K > 24 month,1000
THIES,I 18-21 month,3000
";
        let registry = fit_registry(&layout, training.as_bytes()).unwrap();
        assert!(registry.is_optional("TOP_PACK"));
        assert_eq!(registry.input_domain("TOP_PACK"), None);
        assert!(registry.input_domain("REGION").is_some());
    }

    #[test]
    fn test_optional_feature_source_still_required() {
        let training = "REGION,TENURE,MONTANT\nDAKAR,K > 24 month,1000\n";
        assert!(matches!(
            fit_registry(&layout(), training.as_bytes()),
            Err(Error::Fit(msg)) if msg.contains("TOP_PACK")
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let training = "REGION,TENURE,MONTANT,TOP_PACK\n";
        assert!(matches!(
            fit_registry(&layout(), training.as_bytes()),
            Err(Error::Fit(_))
        ));
    }
}
