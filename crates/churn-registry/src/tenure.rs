//! Tenure ordinal tables.
//!
//! Tenure is captured as one of eleven bucket labels. Each deployed classifier
//! was trained against a specific label vocabulary, so the table travels with
//! the registry rather than living in a global constant. Several labels may
//! share a rank when a vocabulary carries historical synonyms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from tenure label to ordinal rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenureTable(BTreeMap<String, u32>);

impl TenureTable {
    /// Build a table from `(label, rank)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(l, r)| (l.into(), r)).collect())
    }

    /// Eleven distinct monthly buckets, ranked 0 through 10.
    pub fn monthly() -> Self {
        Self::from_pairs([
            ("A < 1 month", 0),
            ("B 1-3 month", 1),
            ("C 3-6 month", 2),
            ("D 6-9 month", 3),
            ("E 9-12 month", 4),
            ("F 12-15 month", 5),
            ("G 15-18 month", 6),
            ("H 18-21 month", 7),
            ("I 21-24 month", 8),
            ("J 24 month", 9),
            ("K > 24 month", 10),
        ])
    }

    /// Quarterly buckets ranked 0 through 8.
    ///
    /// `I 18-21 month` and `J 21-24 month` are legacy duplicates of the G and H
    /// buckets and share their ranks.
    pub fn quarterly() -> Self {
        Self::from_pairs([
            ("A 0-3 month", 0),
            ("B 3-6 month", 1),
            ("C 6-9 month", 2),
            ("D 9-12 month", 3),
            ("E 12-15 month", 4),
            ("F 15-18 month", 5),
            ("G 18-21 month", 6),
            ("H 21-24 month", 7),
            ("I 18-21 month", 6),
            ("J 21-24 month", 7),
            ("K > 24 month", 8),
        ])
    }

    /// Rank for a label, if the label is part of the vocabulary.
    ///
    /// Surrounding whitespace is ignored; matching is otherwise exact.
    pub fn rank(&self, label: &str) -> Option<u32> {
        self.0.get(label.trim()).copied()
    }

    /// Highest rank in the table.
    pub fn max_rank(&self) -> Option<u32> {
        self.0.values().copied().max()
    }

    /// Labels ordered by rank, ties broken by label.
    pub fn labels_by_rank(&self) -> Vec<&str> {
        let mut labels: Vec<(&str, u32)> = self.0.iter().map(|(l, r)| (l.as_str(), *r)).collect();
        labels.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        labels.into_iter().map(|(l, _)| l).collect()
    }

    /// Iterate over `(label, rank)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(l, r)| (l.as_str(), *r))
    }

    /// Number of labels, synonyms included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_ranks_are_distinct() {
        let table = TenureTable::monthly();
        assert_eq!(table.len(), 11);
        assert_eq!(table.rank("A < 1 month"), Some(0));
        assert_eq!(table.rank("K > 24 month"), Some(10));
        assert_eq!(table.max_rank(), Some(10));

        let mut ranks: Vec<u32> = table.iter().map(|(_, r)| r).collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), 11);
    }

    #[test]
    fn test_quarterly_synonyms_share_rank() {
        let table = TenureTable::quarterly();
        assert_eq!(table.len(), 11);
        assert_eq!(table.rank("I 18-21 month"), table.rank("G 18-21 month"));
        assert_eq!(table.rank("J 21-24 month"), table.rank("H 21-24 month"));
        assert_eq!(table.rank("K > 24 month"), Some(8));
        assert_eq!(table.max_rank(), Some(8));
    }

    #[test]
    fn test_monthly_bucket_order_is_strictly_increasing() {
        // Labels start with their bucket letter, so label order is bucket order.
        let ranks: Vec<u32> = TenureTable::monthly().iter().map(|(_, r)| r).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_quarterly_endpoints_bound_all_ranks() {
        // I and J repeat G and H, so only the endpoints are strictly ordered.
        let ranks: Vec<u32> = TenureTable::quarterly().iter().map(|(_, r)| r).collect();
        let first = ranks[0];
        let last = ranks[ranks.len() - 1];
        assert!(first < last);
        assert!(ranks.iter().all(|r| (first..=last).contains(r)));
    }

    #[test]
    fn test_rank_trims_whitespace() {
        let table = TenureTable::quarterly();
        assert_eq!(table.rank("  K > 24 month "), Some(8));
        assert_eq!(table.rank("k > 24 month"), None);
    }

    #[test]
    fn test_labels_by_rank() {
        let table = TenureTable::monthly();
        let labels = table.labels_by_rank();
        assert_eq!(labels.first(), Some(&"A < 1 month"));
        assert_eq!(labels.last(), Some(&"K > 24 month"));
    }
}
