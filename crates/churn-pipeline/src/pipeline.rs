//! Feature Pipeline
//!
//! Compiles a registry's `feature_order` into a fixed encoding plan, then
//! applies that plan to records. Compilation is where registry/pipeline skew
//! is caught; encoding itself only fails on missing or mistyped fields.
//!
//! Encoding runs in stages, always in this order:
//! 1. ordinal tenure columns
//! 2. categorical columns (frequency, one-hot)
//! 3. scaled numeric columns
//!
//! and writes each value into its `feature_order` slot, so the output order
//! never depends on the stage order.

use crate::attribute::Attribute;
use crate::error::{PipelineError, Result};
use crate::record::RawRecord;
use crate::transform::Transform;
use crate::vector::FeatureVector;
use churn_registry::{EncoderRegistry, FeatureDef, REGISTRY_SCHEMA_VERSION, ScaleParams};
use std::sync::Arc;
use tracing::debug;

/// Registry layout version this pipeline build understands.
pub const PIPELINE_SCHEMA_VERSION: u32 = REGISTRY_SCHEMA_VERSION;

/// Value written for columns whose optional source is absent.
const ABSENT_FILL: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ordinal,
    Categorical,
    Numeric,
}

impl Stage {
    const ORDER: [Self; 3] = [Self::Ordinal, Self::Categorical, Self::Numeric];
}

#[derive(Debug, Clone)]
enum Step {
    Ordinal,
    Frequency { scaler: ScaleParams },
    OneHot { category: String },
    Scaled { scaler: ScaleParams },
}

impl Step {
    const fn stage(&self) -> Stage {
        match self {
            Self::Ordinal => Stage::Ordinal,
            Self::Frequency { .. } | Self::OneHot { .. } => Stage::Categorical,
            Self::Scaled { .. } => Stage::Numeric,
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    source: Attribute,
    optional: bool,
    step: Step,
}

#[derive(Debug, Clone)]
struct Plan {
    names: Arc<[String]>,
    columns: Vec<Column>,
}

impl Plan {
    fn compile(registry: &EncoderRegistry) -> Result<Self> {
        if registry.schema_version() != PIPELINE_SCHEMA_VERSION {
            return Err(PipelineError::SchemaMismatch(format!(
                "registry '{}' has schema version {}, this pipeline supports {}",
                registry.name(),
                registry.schema_version(),
                PIPELINE_SCHEMA_VERSION
            )));
        }

        if let Some(field) = registry
            .optional_fields()
            .find(|f| f.parse::<Attribute>().is_err())
        {
            return Err(PipelineError::SchemaMismatch(format!(
                "optional field '{field}' is not a record attribute"
            )));
        }

        let columns = registry
            .feature_order()
            .iter()
            .map(|def| compile_column(registry, def))
            .collect::<Result<Vec<_>>>()?;
        let names: Arc<[String]> = columns.iter().map(|c| c.name.clone()).collect();

        debug!(
            registry = registry.name(),
            features = columns.len(),
            "Compiled feature pipeline"
        );
        Ok(Self { names, columns })
    }

    fn run(&self, record: &RawRecord, registry: &EncoderRegistry) -> Result<FeatureVector> {
        let mut values = vec![ABSENT_FILL; self.columns.len()];
        for stage in Stage::ORDER {
            for (slot, column) in self.columns.iter().enumerate() {
                if column.step.stage() == stage {
                    values[slot] = encode_column(column, record, registry)?;
                }
            }
        }
        Ok(FeatureVector::new(Arc::clone(&self.names), values))
    }
}

fn mismatch(def: &FeatureDef, reason: impl std::fmt::Display) -> PipelineError {
    PipelineError::SchemaMismatch(format!("feature '{}': {reason}", def.name))
}

fn compile_column(registry: &EncoderRegistry, def: &FeatureDef) -> Result<Column> {
    let transform: Transform = def.transform.parse().map_err(|e| mismatch(def, e))?;
    let source: Attribute = def
        .source
        .parse()
        .map_err(|_| mismatch(def, format!("unknown source field '{}'", def.source)))?;
    if !transform.accepts(source) {
        return Err(mismatch(
            def,
            format!("transform '{transform}' cannot encode field {source}"),
        ));
    }

    let step = match transform {
        Transform::Ordinal => Step::Ordinal,
        Transform::Frequency => {
            if !registry.has_frequency_table(source.as_str()) {
                return Err(mismatch(def, format!("no frequency table for {source}")));
            }
            match registry.scale_params(&def.name) {
                Some(scaler @ ScaleParams::MinMax { .. }) => Step::Frequency { scaler: *scaler },
                Some(other) => {
                    return Err(mismatch(
                        def,
                        format!("encoded column needs min_max scaling, found {}", other.kind()),
                    ));
                }
                None => return Err(mismatch(def, "no fitted min/max for encoded column")),
            }
        }
        Transform::OneHot => {
            let category = def
                .category
                .clone()
                .ok_or_else(|| mismatch(def, "one_hot column without a category"))?;
            Step::OneHot { category }
        }
        Transform::Scaled => {
            let scaler = registry
                .scale_params(&def.name)
                .copied()
                .ok_or_else(|| mismatch(def, "no fitted scaling parameters"))?;
            Step::Scaled { scaler }
        }
    };

    Ok(Column {
        name: def.name.clone(),
        source,
        optional: registry.is_optional(source.as_str()),
        step,
    })
}

fn encode_column(column: &Column, record: &RawRecord, registry: &EncoderRegistry) -> Result<f64> {
    let source = column.source;
    let value = match &column.step {
        Step::Ordinal => record
            .category(source)?
            .map(|label| f64::from(registry.tenure_rank(label))),
        Step::Frequency { scaler } => record
            .category(source)?
            .map(|value| scaler.apply(registry.category_frequency(source.as_str(), value))),
        Step::OneHot { category } => record
            .category(source)?
            .map(|value| if value == category { 1.0 } else { 0.0 }),
        Step::Scaled { scaler } => record.numeric(source)?.map(|x| scaler.apply(x)),
    };

    match value {
        Some(v) => Ok(v),
        None if column.optional => {
            debug!(feature = %column.name, field = %source, "Optional field absent, filling zero");
            Ok(ABSENT_FILL)
        }
        None => Err(PipelineError::MissingField(source)),
    }
}

/// Encoding plan bound to a shared registry.
///
/// Compile once at startup and reuse for every request; encoding does not
/// mutate the pipeline or the registry.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    registry: Arc<EncoderRegistry>,
    plan: Plan,
}

impl FeaturePipeline {
    /// Compile a pipeline for the registry.
    ///
    /// # Errors
    /// Returns [`PipelineError::SchemaMismatch`] when the registry's version or
    /// feature layout is not supported by this build.
    pub fn new(registry: Arc<EncoderRegistry>) -> Result<Self> {
        let plan = Plan::compile(&registry)?;
        Ok(Self { registry, plan })
    }

    /// Encode a record into the classifier's input vector.
    pub fn encode(&self, record: &RawRecord) -> Result<FeatureVector> {
        self.plan.run(record, &self.registry)
    }

    /// Registry the pipeline was compiled against.
    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    /// Output column names in classifier order.
    pub fn feature_names(&self) -> &[String] {
        &self.plan.names
    }

    /// Length of every vector this pipeline produces.
    pub fn len(&self) -> usize {
        self.plan.columns.len()
    }

    /// Whether the pipeline produces empty vectors.
    pub fn is_empty(&self) -> bool {
        self.plan.columns.is_empty()
    }

    /// Source fields a record must provide.
    pub fn required_fields(&self) -> Vec<Attribute> {
        let mut fields: Vec<Attribute> = self
            .plan
            .columns
            .iter()
            .filter(|c| !c.optional)
            .map(|c| c.source)
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }
}

/// Encode a single record against a registry.
///
/// Compiles a throwaway plan; use [`FeaturePipeline`] when encoding many records.
pub fn encode(record: &RawRecord, registry: &EncoderRegistry) -> Result<FeatureVector> {
    Plan::compile(registry)?.run(record, registry)
}
