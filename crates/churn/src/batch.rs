//! CSV batch scoring.
//!
//! The header names record attributes. Columns that name no attribute
//! (customer ids, the training label) are skipped; empty cells mean the field
//! is absent. A row that fails to parse or encode is reported with its error
//! and never receives a probability.

use crate::error::Result;
use crate::predictor::Predictor;
use churn_pipeline::{Attribute, PipelineError, RawRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// A parsed CSV row, or the reason it could not be parsed.
pub type ParsedRow = std::result::Result<RawRecord, PipelineError>;

/// Outcome for one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// 1-based data row number, header excluded
    pub row: usize,
    /// Churn decision, absent on failure
    pub churn: Option<bool>,
    /// Churn probability, absent on failure
    pub probability: Option<f64>,
    /// Failure message, absent on success
    pub error: Option<String>,
}

impl BatchOutcome {
    /// Whether the row was scored.
    pub const fn is_scored(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals over a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Rows read
    pub total: usize,
    /// Rows scored
    pub scored: usize,
    /// Rows that failed
    pub failed: usize,
    /// Scored rows predicted to churn
    pub churners: usize,
}

impl BatchSummary {
    /// Tally outcomes.
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.total += 1;
            if outcome.is_scored() {
                summary.scored += 1;
                if outcome.churn == Some(true) {
                    summary.churners += 1;
                }
            } else {
                summary.failed += 1;
            }
            summary
        })
    }
}

/// Parse CSV rows into records.
///
/// # Errors
/// Fails only if the CSV itself is unreadable; bad cells are reported per row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<Option<Attribute>> = reader
        .headers()?
        .iter()
        .map(|header| {
            let field = header.parse::<Attribute>().ok();
            if field.is_none() {
                warn!(column = header, "Skipping column that names no attribute");
            }
            field
        })
        .collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let parsed = columns
            .iter()
            .zip(row.iter())
            .filter_map(|(field, cell)| field.map(|field| (field, cell)))
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(field, cell)| RawRecord::parse_value(field, cell).map(|value| (field, value)))
            .collect::<std::result::Result<RawRecord, PipelineError>>();
        rows.push(parsed);
    }
    Ok(rows)
}

/// Parse a CSV file into records.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<ParsedRow>> {
    read_records(File::open(path)?)
}

/// Score parsed rows one by one.
pub fn score_records(predictor: &Predictor, rows: Vec<ParsedRow>) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = rows
        .into_iter()
        .enumerate()
        .map(|(index, parsed)| {
            let row = index + 1;
            let scored = parsed
                .map_err(crate::Error::from)
                .and_then(|record| predictor.predict(&record));
            match scored {
                Ok(result) => BatchOutcome {
                    row,
                    churn: Some(result.churn),
                    probability: Some(result.probability),
                    error: None,
                },
                Err(e) => {
                    warn!(row, error = %e, "Row not scored");
                    BatchOutcome {
                        row,
                        churn: None,
                        probability: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    let summary = BatchSummary::from_outcomes(&outcomes);
    info!(
        total = summary.total,
        scored = summary.scored,
        failed = summary.failed,
        "Batch scored"
    );
    outcomes
}

/// Read and score a CSV source.
pub fn score_reader<R: Read>(predictor: &Predictor, reader: R) -> Result<Vec<BatchOutcome>> {
    Ok(score_records(predictor, read_records(reader)?))
}
