//! Record field vocabulary.
//!
//! Field names match the training columns exactly, case included.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a field carries a category label or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Free-text category label
    Categorical,
    /// Non-negative real number
    Numeric,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categorical => write!(f, "categorical"),
            Self::Numeric => write!(f, "numeric"),
        }
    }
}

/// A raw customer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    /// Home region
    #[serde(rename = "REGION")]
    Region,
    /// Tenure bucket label
    #[serde(rename = "TENURE")]
    Tenure,
    /// Most purchased top-up pack
    #[serde(rename = "TOP_PACK")]
    TopPack,
    /// Top-up amount
    #[serde(rename = "MONTANT")]
    Montant,
    /// Number of top-ups
    #[serde(rename = "FREQUENCE_RECH")]
    FrequenceRech,
    /// Monthly revenue
    #[serde(rename = "REVENUE")]
    Revenue,
    /// Revenue over ninety days divided by three
    #[serde(rename = "ARPU_SEGMENT")]
    ArpuSegment,
    /// Number of times the customer made an income
    #[serde(rename = "FREQUENCE")]
    Frequence,
    /// Data volume
    #[serde(rename = "DATA_VOLUME")]
    DataVolume,
    /// On-network calls
    #[serde(rename = "ON_NET")]
    OnNet,
    /// Calls to the ORANGE network
    #[serde(rename = "ORANGE")]
    Orange,
    /// Calls to the TIGO network
    #[serde(rename = "TIGO")]
    Tigo,
    /// Number of active days over ninety days
    #[serde(rename = "REGULARITY")]
    Regularity,
    /// Number of times the top pack was activated
    #[serde(rename = "FREQ_TOP_PACK")]
    FreqTopPack,
}

impl Attribute {
    /// Every field, categorical first.
    pub const ALL: [Self; 14] = [
        Self::Region,
        Self::Tenure,
        Self::TopPack,
        Self::Montant,
        Self::FrequenceRech,
        Self::Revenue,
        Self::ArpuSegment,
        Self::Frequence,
        Self::DataVolume,
        Self::OnNet,
        Self::Orange,
        Self::Tigo,
        Self::Regularity,
        Self::FreqTopPack,
    ];

    /// Column name used in training data and registries.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "REGION",
            Self::Tenure => "TENURE",
            Self::TopPack => "TOP_PACK",
            Self::Montant => "MONTANT",
            Self::FrequenceRech => "FREQUENCE_RECH",
            Self::Revenue => "REVENUE",
            Self::ArpuSegment => "ARPU_SEGMENT",
            Self::Frequence => "FREQUENCE",
            Self::DataVolume => "DATA_VOLUME",
            Self::OnNet => "ON_NET",
            Self::Orange => "ORANGE",
            Self::Tigo => "TIGO",
            Self::Regularity => "REGULARITY",
            Self::FreqTopPack => "FREQ_TOP_PACK",
        }
    }

    /// Value kind the field carries.
    pub const fn kind(&self) -> AttributeKind {
        match self {
            Self::Region | Self::Tenure | Self::TopPack => AttributeKind::Categorical,
            _ => AttributeKind::Numeric,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = crate::error::PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| crate::error::PipelineError::UnknownAttribute(s.to_string()))
    }
}
