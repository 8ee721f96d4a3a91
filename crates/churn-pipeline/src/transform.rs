//! Transforms this pipeline build implements.

use crate::attribute::{Attribute, AttributeKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Encoding applied to produce one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Tenure label to rank
    Ordinal,
    /// Category to training frequency, then fitted min/max normalisation
    Frequency,
    /// Category indicator
    OneHot,
    /// Numeric value through fitted scaling
    Scaled,
}

impl Transform {
    /// Every transform this build understands.
    pub const ALL: [Self; 4] = [Self::Ordinal, Self::Frequency, Self::OneHot, Self::Scaled];

    /// Name used in registry artifacts.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinal => "ordinal",
            Self::Frequency => "frequency",
            Self::OneHot => "one_hot",
            Self::Scaled => "scaled",
        }
    }

    /// Whether the transform can be applied to a source field.
    pub fn accepts(&self, source: Attribute) -> bool {
        match self {
            Self::Ordinal => source == Attribute::Tenure,
            Self::Frequency => matches!(source, Attribute::Region | Attribute::TopPack),
            Self::OneHot => source.kind() == AttributeKind::Categorical,
            Self::Scaled => source.kind() == AttributeKind::Numeric,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported transform '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Transform::Ordinal, Attribute::Tenure, true)]
    #[case(Transform::Ordinal, Attribute::Region, false)]
    #[case(Transform::Frequency, Attribute::Region, true)]
    #[case(Transform::Frequency, Attribute::TopPack, true)]
    #[case(Transform::Frequency, Attribute::Tenure, false)]
    #[case(Transform::OneHot, Attribute::Region, true)]
    #[case(Transform::OneHot, Attribute::Montant, false)]
    #[case(Transform::Scaled, Attribute::Montant, true)]
    #[case(Transform::Scaled, Attribute::TopPack, false)]
    fn test_accepts(#[case] transform: Transform, #[case] source: Attribute, #[case] ok: bool) {
        assert_eq!(transform.accepts(source), ok);
    }

    #[test]
    fn test_parse() {
        assert_eq!("one_hot".parse::<Transform>().unwrap(), Transform::OneHot);
        assert!("target_mean".parse::<Transform>().is_err());
    }
}
