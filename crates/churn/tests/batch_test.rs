//! Integration tests for CSV batch scoring and export.

use churn::batch::{self, BatchSummary};
use churn::export::{ExportFormat, Exporter};
use churn::{ChurnConfig, Predictor};
use std::fs;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn predictor() -> Predictor {
    Predictor::from_config(&ChurnConfig {
        registry_path: format!("{FIXTURES}/expresso_registry.json").into(),
        model_path: format!("{FIXTURES}/expresso_model.json").into(),
        ..ChurnConfig::default()
    })
    .unwrap()
}

#[test]
fn test_batch_reports_failed_rows() {
    let rows = batch::read_records_from_path(format!("{FIXTURES}/customers.csv")).unwrap();
    let outcomes = batch::score_records(&predictor(), rows);
    assert_eq!(outcomes.len(), 4);

    assert_eq!(outcomes[0].row, 1);
    assert!(outcomes[0].is_scored());
    assert_eq!(outcomes[0].churn, Some(false));

    // REGION left empty
    assert!(outcomes[1].probability.is_none());
    assert!(outcomes[1].error.as_deref().unwrap().contains("REGION"));

    // MONTANT is not a number
    assert!(outcomes[2].churn.is_none());
    assert!(outcomes[2].error.as_deref().unwrap().contains("MONTANT"));

    // Unseen region and tenure still score; low regularity tips it over
    assert!(outcomes[3].is_scored());
    assert_eq!(outcomes[3].churn, Some(true));

    assert_eq!(
        BatchSummary::from_outcomes(&outcomes),
        BatchSummary {
            total: 4,
            scored: 2,
            failed: 2,
            churners: 1
        }
    );
}

#[test]
fn test_batch_export_roundtrip() {
    let csv = fs::read_to_string(format!("{FIXTURES}/customers.csv")).unwrap();
    let outcomes = batch::score_reader(&predictor(), csv.as_bytes()).unwrap();

    let path = std::env::temp_dir().join(format!("churn-batch-{}.csv", std::process::id()));
    outcomes.export_to_file(&path, ExportFormat::Csv).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("row,churn,probability,error"));
    assert_eq!(lines.count(), 4);

    let json = outcomes.export_to_string(ExportFormat::Json).unwrap();
    let parsed: Vec<batch::BatchOutcome> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, outcomes);
}

#[test]
fn test_unreadable_csv() {
    let ragged = "REGION,TENURE\nDAKAR\n";
    assert!(batch::read_records(ragged.as_bytes()).is_err());
}
