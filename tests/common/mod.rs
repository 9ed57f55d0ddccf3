//! Shared fixtures for integration tests
//!
//! Artifacts are written to a temporary directory so each test loads them
//! through the same path the service uses.

#![allow(dead_code)]

use bank_churn_predictor::ml::{
    write_artifact, ArtifactPaths, ClassifierArtifact, DecisionTree, GradientBoostingClassifier,
    LogisticRegressionClassifier, OneHotEncoderArtifact, RandomForestClassifier, ScalerArtifact,
    StandardScaler, NUMERIC_COLUMNS,
};
use bank_churn_predictor::models::{CustomerProfile, Gender, Geography, YesNo};
use std::collections::HashMap;
use tempfile::TempDir;

pub const ENCODED_COLUMNS: [&str; 5] = [
    "Geography_France",
    "Geography_Germany",
    "Geography_Spain",
    "Gender_Female",
    "Gender_Male",
];

/// The reference customer: 650, France, Female, 40, 5, 50000.00, 2, yes, yes, 60000.00
pub fn sample_profile() -> CustomerProfile {
    CustomerProfile {
        name: "prince".to_string(),
        credit_score: 650,
        geography: Some(Geography::France),
        gender: Some(Gender::Female),
        age: 40,
        tenure: 5,
        balance: 50000.00,
        num_of_products: 2,
        has_cr_card: Some(YesNo::Yes),
        is_active_member: Some(YesNo::Yes),
        estimated_salary: 60000.00,
    }
}

/// Preprocessed column names, scaled numerics then one-hot columns
pub fn feature_names() -> Vec<String> {
    NUMERIC_COLUMNS
        .iter()
        .chain(ENCODED_COLUMNS.iter())
        .map(|c| c.to_string())
        .collect()
}

pub fn scaler() -> ScalerArtifact {
    ScalerArtifact::Standard(StandardScaler {
        feature_names_in: NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        mean: vec![650.53, 38.92, 5.01, 76485.89, 1.53, 0.71, 0.52, 100090.24],
        scale: vec![96.65, 10.49, 2.89, 62394.29, 0.58, 0.46, 0.50, 57507.62],
    })
}

pub fn encoder() -> OneHotEncoderArtifact {
    OneHotEncoderArtifact {
        feature_names_in: vec!["Geography".to_string(), "Gender".to_string()],
        categories: vec![
            vec!["France".into(), "Germany".into(), "Spain".into()],
            vec!["Female".into(), "Male".into()],
        ],
        drop_idx: vec![None, None],
    }
}

pub fn logistic_regression() -> ClassifierArtifact {
    ClassifierArtifact::LogisticRegression(LogisticRegressionClassifier {
        feature_names_in: feature_names(),
        coef: vec![
            -0.06, 0.76, -0.04, 0.16, -0.06, -0.02, -0.53, 0.03, -0.25, 0.52, -0.27, 0.13, -0.13,
        ],
        intercept: -1.63,
    })
}

/// One split on Age (scaled): older customers lean towards churn
fn age_stump(left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
    let width = left.len();
    DecisionTree {
        children_left: vec![1, -1, -1],
        children_right: vec![2, -1, -1],
        feature: vec![1, -2, -2],
        threshold: vec![0.5, -2.0, -2.0],
        value: vec![vec![0.0; width], left, right],
    }
}

pub fn random_forest() -> ClassifierArtifact {
    ClassifierArtifact::RandomForest(RandomForestClassifier {
        feature_names_in: feature_names(),
        n_features: 13,
        trees: vec![
            age_stump(vec![90.0, 10.0], vec![40.0, 60.0]),
            age_stump(vec![85.0, 15.0], vec![30.0, 70.0]),
        ],
    })
}

pub fn gradient_boosting() -> ClassifierArtifact {
    ClassifierArtifact::GradientBoosting(GradientBoostingClassifier {
        feature_names_in: feature_names(),
        n_features: 13,
        init: -1.37,
        learning_rate: 0.1,
        trees: vec![age_stump(vec![-0.4], vec![1.2]), age_stump(vec![-0.3], vec![1.1])],
    })
}

/// Write the three artifacts with the given extension into a fresh directory
pub fn write_artifacts(model: &ClassifierArtifact, ext: &str) -> (TempDir, ArtifactPaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = ArtifactPaths {
        scaler: dir.path().join(format!("scaler.{}", ext)),
        encoder: dir.path().join(format!("encoder.{}", ext)),
        model: dir.path().join(format!("model.{}", ext)),
    };

    write_artifact(&paths.scaler, &scaler()).expect("write scaler");
    write_artifact(&paths.encoder, &encoder()).expect("write encoder");
    write_artifact(&paths.model, model).expect("write model");

    (dir, paths)
}

/// Form fields for [`sample_profile`], as a browser would post them
pub fn sample_form() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("name", "prince"),
        ("credit_score", "650"),
        ("geography", "France"),
        ("gender", "Female"),
        ("age", "40"),
        ("tenure", "5"),
        ("balance", "50000.00"),
        ("num_of_products", "2"),
        ("has_cr_card", "yes"),
        ("is_active_member", "yes"),
        ("estimated_salary", "60000.00"),
    ])
}

/// Encode form fields as `application/x-www-form-urlencoded`
pub fn urlencode(fields: &HashMap<&str, &str>) -> String {
    serde_urlencoded::to_string(fields).expect("encode form")
}

/// Minimal Prometheus text parser: metric name to sample lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
