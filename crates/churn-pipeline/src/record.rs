//! Raw customer records.
//!
//! A record is what the form layer captured for one customer: a sparse map
//! from field to value. It is built once per request and not mutated after.

use crate::attribute::{Attribute, AttributeKind};
use crate::error::{PipelineError, Result};
use churn_registry::EncoderRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Real number
    Numeric(f64),
    /// Category label
    Category(String),
}

impl AttributeValue {
    /// Kind of value held.
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Numeric(_) => AttributeKind::Numeric,
            Self::Category(_) => AttributeKind::Categorical,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// Field values captured for one customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<Attribute, AttributeValue>);

impl RawRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record with `field` set to `value`.
    pub fn with(mut self, field: Attribute, value: impl Into<AttributeValue>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    /// Parse a record from a JSON object keyed by field name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a record from `KEY=VALUE` assignments.
    ///
    /// Values are interpreted according to the field's kind.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| PipelineError::MalformedAssignment(assignment.to_string()))?;
            let field: Attribute = key.trim().parse()?;
            record.0.insert(field, Self::parse_value(field, value)?);
        }
        Ok(record)
    }

    /// Interpret text as a value for `field`.
    pub fn parse_value(field: Attribute, text: &str) -> Result<AttributeValue> {
        match field.kind() {
            AttributeKind::Categorical => Ok(AttributeValue::Category(text.to_string())),
            AttributeKind::Numeric => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(AttributeValue::Numeric)
                .ok_or_else(|| PipelineError::InvalidValue {
                    field,
                    value: text.to_string(),
                }),
        }
    }

    /// Record pre-filled from the registry's input domains.
    ///
    /// Categorical fields take their first option, numeric fields the
    /// midpoint of their training range. Tenure falls back to the lowest
    /// ranked label when no domain was recorded.
    pub fn template(registry: &EncoderRegistry) -> Self {
        let mut record = Self::new();
        for field in Attribute::ALL {
            let value = match registry.input_domain(field.as_str()) {
                Some(domain) => domain
                    .first_category()
                    .map(AttributeValue::from)
                    .or_else(|| domain.midpoint().map(AttributeValue::Numeric)),
                None if field == Attribute::Tenure => registry
                    .tenure_table()
                    .labels_by_rank()
                    .first()
                    .map(|l| AttributeValue::Category((*l).to_string())),
                None => None,
            };
            if let Some(value) = value {
                record.0.insert(field, value);
            }
        }
        record
    }

    /// Raw value of a field.
    pub fn get(&self, field: Attribute) -> Option<&AttributeValue> {
        self.0.get(&field)
    }

    /// Whether the field is present.
    pub fn contains(&self, field: Attribute) -> bool {
        self.0.contains_key(&field)
    }

    /// Category label of a categorical field.
    pub fn category(&self, field: Attribute) -> Result<Option<&str>> {
        match self.0.get(&field) {
            None => Ok(None),
            Some(AttributeValue::Category(label)) => Ok(Some(label.as_str())),
            Some(AttributeValue::Numeric(_)) => Err(PipelineError::InvalidFieldType {
                field,
                expected: AttributeKind::Categorical,
            }),
        }
    }

    /// Number held by a numeric field.
    pub fn numeric(&self, field: Attribute) -> Result<Option<f64>> {
        match self.0.get(&field) {
            None => Ok(None),
            Some(AttributeValue::Numeric(value)) => Ok(Some(*value)),
            Some(AttributeValue::Category(_)) => Err(PipelineError::InvalidFieldType {
                field,
                expected: AttributeKind::Numeric,
            }),
        }
    }

    /// Iterate over present fields in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeValue)> {
        self.0.iter().map(|(a, v)| (*a, v))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Attribute, AttributeValue)> for RawRecord {
    fn from_iter<T: IntoIterator<Item = (Attribute, AttributeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
