//! Category frequency tables.
//!
//! Frequency encoding replaces a category with how often it occurred in the
//! training corpus. Values never seen during training encode as `0.0`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frequency assigned to categories absent from the training corpus.
pub const UNSEEN_FREQUENCY: f64 = 0.0;

/// Fitted category -> frequency table for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<String, f64>);

impl FrequencyTable {
    /// Build a table from precomputed `(category, frequency)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(c, f)| (c.into(), f)).collect())
    }

    /// Fit raw occurrence counts over a training column.
    pub fn fit_counts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        for value in values {
            *counts.entry(value.as_ref().to_string()).or_insert(0.0) += 1.0;
        }
        Self(counts)
    }

    /// Fit occurrence proportions over a training column.
    ///
    /// Proportions sum to one over the observed categories.
    pub fn fit_proportions<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Self(mut counts) = Self::fit_counts(values);
        let total: f64 = counts.values().sum();
        if total > 0.0 {
            for freq in counts.values_mut() {
                *freq /= total;
            }
        }
        Self(counts)
    }

    /// Frequency for a category, `None` when it was never observed.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    /// Frequency for a category, falling back to [`UNSEEN_FREQUENCY`].
    pub fn frequency(&self, category: &str) -> f64 {
        self.get(category).unwrap_or(UNSEEN_FREQUENCY)
    }

    /// Smallest fitted frequency.
    pub fn min(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::min)
    }

    /// Largest fitted frequency.
    pub fn max(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::max)
    }

    /// Observed categories in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(category, frequency)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(c, f)| (c.as_str(), *f))
    }

    /// Number of observed categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
