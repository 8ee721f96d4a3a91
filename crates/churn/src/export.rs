//! Export of predictions and batch outcomes as CSV or JSON.

use crate::batch::BatchOutcome;
use crate::error::{Error, Result};
use crate::predictor::Prediction;
use churn_scoring::PredictionResult;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::PrettyJson,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(Error::Export(format!("unknown format {other:?}"))),
        }
    }
}

/// One `field,value` line of a flattened prediction.
#[derive(Debug, Serialize)]
struct PredictionFlat<'a> {
    field: &'a str,
    value: f64,
}

impl Prediction {
    fn to_flat_records(&self) -> Vec<PredictionFlat<'_>> {
        let mut records: Vec<PredictionFlat<'_>> = self
            .features
            .iter()
            .map(|(field, value)| PredictionFlat { field, value })
            .collect();
        records.push(PredictionFlat {
            field: "probability",
            value: self.result.probability,
        });
        records.push(PredictionFlat {
            field: "churn",
            value: if self.result.churn { 1.0 } else { 0.0 },
        });
        records
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_string<T, I>(records: I) -> Result<String>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

fn json_string<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::PrettyJson => serde_json::to_string_pretty(value)?,
        ExportFormat::Json | ExportFormat::Csv => serde_json::to_string(value)?,
    })
}

impl Exporter for PredictionResult {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_string([self]),
            _ => json_string(self, format),
        }
    }
}

impl Exporter for Prediction {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_string(self.to_flat_records()),
            _ => json_string(self, format),
        }
    }
}

impl Exporter for [BatchOutcome] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_string(self),
            _ => json_string(self, format),
        }
    }
}

impl Exporter for Vec<BatchOutcome> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        self.as_slice().export_to_string(format)
    }
}
