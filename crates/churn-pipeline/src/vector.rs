//! Encoded feature vectors.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Classifier input produced from one record.
///
/// Values are in the registry's `feature_order`; the column names travel with
/// them so callers can inspect or log the encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Build a vector from bare values, naming columns by position.
    ///
    /// Intended for callers that already hold an encoded row.
    pub fn from_values(values: Vec<f64>) -> Self {
        let names: Arc<[String]> = (0..values.len()).map(|i| format!("f{i}")).collect();
        Self { names, values }
    }

    /// Encoded values in classifier order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column names in classifier order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Value of a named column.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Serializes as a `name -> value` map in classifier order.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values() {
        let vector = FeatureVector::from_values(vec![0.5, 1.0]);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.names(), &["f0".to_string(), "f1".to_string()]);
        assert_eq!(vector.get("f1"), Some(1.0));
        assert_eq!(vector.get("f2"), None);
    }

    #[test]
    fn test_iter_pairs() {
        let names: Arc<[String]> = vec!["TENURE".to_string(), "MONTANT".to_string()].into();
        let vector = FeatureVector::new(names, vec![8.0, -0.7]);
        let pairs: Vec<_> = vector.iter().collect();
        assert_eq!(pairs, vec![("TENURE", 8.0), ("MONTANT", -0.7)]);
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let vector = FeatureVector::new(
            vec!["TENURE".to_string(), "REGION_FE".to_string()].into(),
            vec![8.0, 0.75],
        );
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"TENURE":8.0,"REGION_FE":0.75}"#);
    }
}
