//! Tests for the Prometheus metrics exported by the predictor
//!
//! Covers counters driven by the pipeline and exposition format compliance.
mod common;

use bank_churn_predictor::metrics::{
    gather_metrics, init_metrics, ARTIFACT_LOADS_TOTAL, PREDICTIONS_TOTAL,
    PREDICTION_DURATION_SECONDS, PREDICTION_ERRORS_TOTAL,
};
use bank_churn_predictor::ml::{ArtifactPaths, ArtifactStore, PredictionService};
use common::*;
use std::sync::Arc;

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    !name.starts_with("__") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[test]
fn test_prediction_outcome_and_duration_are_recorded() {
    let (_dir, paths) = write_artifacts(&logistic_regression(), "json");
    let service = PredictionService::new(ArtifactStore::cached(&paths).unwrap());

    let before_count = PREDICTION_DURATION_SECONDS.get_sample_count();
    let prediction = service.predict(&sample_profile()).unwrap();
    let outcome = prediction.label.to_string();

    assert!(PREDICTIONS_TOTAL.with_label_values(&[&outcome]).get() >= 1.0);
    assert!(PREDICTION_DURATION_SECONDS.get_sample_count() > before_count);
}

#[test]
fn test_failures_are_counted_by_error_code() {
    let (_dir, paths) = write_artifacts(&logistic_regression(), "json");
    let service = PredictionService::new(ArtifactStore::cached(&paths).unwrap());
    let mut profile = sample_profile();
    profile.geography = None;

    let before = PREDICTION_ERRORS_TOTAL
        .with_label_values(&["UNSEEN_CATEGORY"])
        .get();
    assert!(service.predict(&profile).is_err());
    let after = PREDICTION_ERRORS_TOTAL
        .with_label_values(&["UNSEEN_CATEGORY"])
        .get();

    assert!(after > before);
}

#[test]
fn test_artifact_load_failures_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let before = ARTIFACT_LOADS_TOTAL
        .with_label_values(&["scaler", "failure"])
        .get();

    assert!(ArtifactStore::cached(&ArtifactPaths::in_dir(dir.path())).is_err());

    let after = ARTIFACT_LOADS_TOTAL
        .with_label_values(&["scaler", "failure"])
        .get();
    assert!(after > before);
}

#[test]
fn test_concurrent_predictions_share_cached_artifacts() {
    let (_dir, paths) = write_artifacts(&random_forest(), "json");
    let service = Arc::new(PredictionService::new(ArtifactStore::cached(&paths).unwrap()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                let mut profile = sample_profile();
                profile.age = 20 + i * 8;
                service.predict(&profile)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
}

#[test]
fn test_exposition_format() {
    let _ = init_metrics();
    PREDICTIONS_TOTAL.with_label_values(&["churn"]).inc();

    let output = gather_metrics();
    let metrics = parse_prometheus_output(&output);

    assert!(metrics.contains_key("bank_churn_predictor_build_info"));
    assert!(metrics.contains_key("bank_churn_predictor_predictions_total"));

    for name in metrics.keys() {
        assert!(is_valid_metric_name(name), "invalid metric name: {}", name);
        assert!(name.starts_with("bank_churn_predictor_"));
    }

    let predictions = &metrics["bank_churn_predictor_predictions_total"];
    assert!(predictions
        .iter()
        .any(|l| l == "# TYPE bank_churn_predictor_predictions_total counter"));
    assert!(predictions.iter().any(|l| l.contains("outcome=\"churn\"")));
}
