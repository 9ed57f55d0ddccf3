/// Churn prediction pipeline
///
/// This module turns a captured customer profile into a churn prediction:
/// - Feature assembly into the canonical single-row record
/// - Numeric scaling and categorical one-hot encoding from fitted artifacts
/// - Binary classification (logistic regression, random forest, gradient boosting)
/// - Artifact loading from JSON, YAML or bincode, cached or per request

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod features;
pub mod models;
pub mod scaler;
pub mod service;

pub use artifacts::{
    read_artifact, write_artifact, ArtifactFormat, ArtifactPaths, ArtifactStore, Artifacts,
};
pub use classifier::{
    Classifier, ClassifierArtifact, DecisionTree, GradientBoostingClassifier,
    LogisticRegressionClassifier, RandomForestClassifier,
};
pub use encoder::OneHotEncoderArtifact;
pub use features::{
    FeatureRow, FeatureValue, FeatureVector, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS, ROW_COLUMNS,
};
pub use models::{ChurnLabel, ChurnPrediction, ModelMetadata, ModelType, ScalerType};
pub use scaler::{MinMaxScaler, ScalerArtifact, StandardScaler};
pub use service::PredictionService;
