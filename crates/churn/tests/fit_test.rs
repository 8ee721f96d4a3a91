//! Integration tests for registry fitting from a training CSV.

use approx::assert_relative_eq;
use churn::fit::{self, FitLayout};
use churn::pipeline::Attribute;
use churn::registry::ScaleParams;
use churn::{EncoderRegistry, LogisticRegression, Predictor, RawRecord};
use std::sync::Arc;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fitted() -> EncoderRegistry {
    fit::fit_registry_from_paths(
        format!("{FIXTURES}/layout.json"),
        format!("{FIXTURES}/training.csv"),
    )
    .unwrap()
}

#[test]
fn test_fitted_parameters() {
    let registry = fitted();
    assert_eq!(registry.name(), "expresso-small");
    assert_eq!(
        registry.feature_names(),
        vec!["REGION_FE", "TENURE", "MONTANT", "REGULARITY", "TOP_PACK_FE"]
    );

    assert_relative_eq!(registry.category_frequency("REGION", "DAKAR"), 0.6);
    assert_relative_eq!(registry.category_frequency("TOP_PACK", "Data:490F=1GB,7d"), 0.25);
    assert_eq!(registry.category_frequency("REGION", "KOLDA"), 0.0);

    match registry.scale_params("MONTANT") {
        Some(ScaleParams::Standard { mean, std }) => {
            assert_relative_eq!(*mean, 5000.0);
            assert_relative_eq!(*std, 5.0e6_f64.sqrt(), epsilon = 1e-9);
        }
        other => panic!("expected standard scaling, got {other:?}"),
    }
    assert_eq!(
        registry.scale_params("REGULARITY"),
        Some(&ScaleParams::MinMax { min: 1.0, max: 62.0 })
    );
    assert!(matches!(
        registry.scale_params("REGION_FE"),
        Some(ScaleParams::MinMax { .. })
    ));
}

#[test]
fn test_saved_registry_reloads() {
    let registry = fitted();
    let path = std::env::temp_dir().join(format!("churn-fit-{}.json", std::process::id()));
    registry.save(&path).unwrap();
    let loaded = EncoderRegistry::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.feature_order(), registry.feature_order());
    assert_eq!(loaded.scale_params("MONTANT"), registry.scale_params("MONTANT"));
    assert_eq!(loaded.tenure_table(), registry.tenure_table());
}

#[test]
fn test_fitted_registry_predicts() {
    let registry = Arc::new(fitted());
    let names = registry
        .feature_names()
        .into_iter()
        .map(String::from)
        .collect();
    let model = LogisticRegression::new(vec![0.0; 5], 0.0)
        .unwrap()
        .with_feature_names(names)
        .unwrap();
    let predictor = Predictor::new(Arc::clone(&registry), Box::new(model)).unwrap();

    let record = RawRecord::new()
        .with(Attribute::Region, "DAKAR")
        .with(Attribute::Tenure, "K > 24 month")
        .with(Attribute::Montant, 5000.0)
        .with(Attribute::Regularity, 62.0);
    let prediction = predictor.explain(&record).unwrap();
    assert_eq!(prediction.features.values(), &[1.0, 8.0, 0.0, 1.0, 0.0]);
    assert_eq!(prediction.result.probability, 0.5);

    let template = RawRecord::template(&registry);
    assert_eq!(
        template.category(Attribute::Tenure).unwrap(),
        Some("E 12-15 month")
    );
    assert_eq!(template.category(Attribute::Region).unwrap(), Some("DAKAR"));
    assert!(predictor.predict(&template).is_ok());
}

#[test]
fn test_layout_rejects_unknown_transform() {
    let json = r#"{"name": "x", "tenure": "monthly",
                   "features": [{"name": "R", "transform": "target", "source": "REGION"}]}"#;
    assert!(serde_json::from_str::<FitLayout>(json).is_err());
}
