use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::Display;

/// Classifier output class. Index 1 of the probability row is churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChurnLabel {
    Stay,
    Churn,
}

impl ChurnLabel {
    /// Class index used by the model (0 = stay, 1 = churn)
    pub fn class_index(self) -> usize {
        match self {
            ChurnLabel::Stay => 0,
            ChurnLabel::Churn => 1,
        }
    }

    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ChurnLabel::Stay),
            1 => Some(ChurnLabel::Churn),
            _ => None,
        }
    }
}

/// Result of one prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnPrediction {
    /// Predicted class
    pub label: ChurnLabel,

    /// P(churn), column 1 of the probability row
    pub probability_churn: f64,

    /// P(stay), always `1 - probability_churn`
    pub probability_stay: f64,
}

impl ChurnPrediction {
    pub fn new(label: ChurnLabel, probability_churn: f64) -> Self {
        Self {
            label,
            probability_churn,
            probability_stay: 1.0 - probability_churn,
        }
    }

    /// Numeric class label (0 = stay, 1 = churn)
    pub fn class_index(&self) -> usize {
        self.label.class_index()
    }

    /// Probability of the predicted class
    pub fn confidence(&self) -> f64 {
        match self.label {
            ChurnLabel::Churn => self.probability_churn,
            ChurnLabel::Stay => self.probability_stay,
        }
    }
}

/// Supported classifier families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

/// Scaler families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScalerType {
    Standard,
    MinMax,
}

/// Description of the loaded artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Classifier family
    pub model_type: ModelType,

    /// Scaler family
    pub scaler_type: ScalerType,

    /// Number of columns the classifier consumes
    pub n_features: usize,

    /// Column names of the preprocessed row, in order
    pub feature_names: Vec<String>,

    /// Encoder vocabulary per categorical column
    pub categories: BTreeMap<String, Vec<String>>,

    /// When the artifacts were loaded
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}
