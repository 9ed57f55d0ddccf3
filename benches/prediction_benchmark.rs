//! Criterion benchmarks for the prediction pipeline
//!
//! Measures feature assembly, preprocessing and the end-to-end predict call
//! for each classifier family.

use bank_churn_predictor::ml::{
    service::{predict_row, preprocess},
    ArtifactStore, Artifacts, Classifier, DecisionTree, FeatureRow, GradientBoostingClassifier,
    LogisticRegressionClassifier, OneHotEncoderArtifact, PredictionService,
    RandomForestClassifier, ScalerArtifact, StandardScaler,
};
use bank_churn_predictor::models::{CustomerProfile, Gender, Geography, YesNo};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn profile() -> CustomerProfile {
    CustomerProfile {
        name: "bench".to_string(),
        credit_score: 650,
        geography: Some(Geography::France),
        gender: Some(Gender::Female),
        age: 40,
        tenure: 5,
        balance: 50000.0,
        num_of_products: 2,
        has_cr_card: Some(YesNo::Yes),
        is_active_member: Some(YesNo::Yes),
        estimated_salary: 60000.0,
    }
}

fn scaler() -> ScalerArtifact {
    ScalerArtifact::Standard(StandardScaler {
        feature_names_in: vec![],
        mean: vec![650.5, 38.9, 5.0, 76485.9, 1.5, 0.7, 0.5, 100090.2],
        scale: vec![96.6, 10.5, 2.9, 62394.3, 0.6, 0.5, 0.5, 57507.6],
    })
}

fn encoder() -> OneHotEncoderArtifact {
    OneHotEncoderArtifact {
        feature_names_in: vec![],
        categories: vec![
            vec!["France".into(), "Germany".into(), "Spain".into()],
            vec!["Female".into(), "Male".into()],
        ],
        drop_idx: vec![],
    }
}

/// Complete binary tree of the given depth, level `l` splitting on feature `l % 13`
fn tree(depth: u32, value_width: usize) -> DecisionTree {
    let mut tree = DecisionTree {
        children_left: vec![],
        children_right: vec![],
        feature: vec![],
        threshold: vec![],
        value: vec![],
    };
    grow(&mut tree, 0, depth, value_width);
    tree
}

fn grow(tree: &mut DecisionTree, level: u32, depth: u32, value_width: usize) -> i64 {
    let id = tree.children_left.len();
    tree.children_left.push(-1);
    tree.children_right.push(-1);
    tree.feature.push(-2);
    tree.threshold.push(-2.0);
    tree.value.push(vec![1.0; value_width]);

    if level < depth {
        tree.feature[id] = (level % 13) as i64;
        tree.threshold[id] = 0.0;
        let left = grow(tree, level + 1, depth, value_width);
        let right = grow(tree, level + 1, depth, value_width);
        tree.children_left[id] = left;
        tree.children_right[id] = right;
    }

    id as i64
}

fn models() -> Vec<(&'static str, Box<dyn Classifier>)> {
    vec![
        (
            "logistic_regression",
            Box::new(LogisticRegressionClassifier {
                feature_names_in: vec![],
                coef: vec![0.1; 13],
                intercept: -1.0,
            }) as Box<dyn Classifier>,
        ),
        (
            "random_forest",
            Box::new(RandomForestClassifier {
                feature_names_in: vec![],
                n_features: 13,
                trees: (0..100).map(|_| tree(8, 2)).collect(),
            }) as Box<dyn Classifier>,
        ),
        (
            "gradient_boosting",
            Box::new(GradientBoostingClassifier {
                feature_names_in: vec![],
                n_features: 13,
                init: -1.4,
                learning_rate: 0.1,
                trees: (0..100).map(|_| tree(3, 1)).collect(),
            }) as Box<dyn Classifier>,
        ),
    ]
}

fn bench_preprocess(c: &mut Criterion) {
    let artifacts = Artifacts::from_parts(scaler(), encoder(), models().remove(0).1);
    let profile = profile();

    c.bench_function("assemble_row", |b| {
        b.iter(|| FeatureRow::assemble(black_box(&profile)))
    });

    let row = FeatureRow::assemble(&profile);
    c.bench_function("preprocess_row", |b| {
        b.iter(|| preprocess(black_box(&artifacts), black_box(&row)))
    });
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let profile = profile();

    for (name, model) in models() {
        let artifacts = Arc::new(Artifacts::from_parts(scaler(), encoder(), model));
        let features = preprocess(&artifacts, &FeatureRow::assemble(&profile))
            .expect("preprocess");

        group.bench_with_input(BenchmarkId::new("row", name), &features, |b, features| {
            b.iter(|| predict_row(black_box(&artifacts), black_box(features)))
        });

        let service = PredictionService::new(ArtifactStore::Cached(artifacts.clone()));
        group.bench_with_input(BenchmarkId::new("end_to_end", name), &profile, |b, profile| {
            b.iter(|| service.predict(black_box(profile)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preprocess, bench_predict);
criterion_main!(benches);
