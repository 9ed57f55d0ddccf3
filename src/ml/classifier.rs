use crate::error::{AppError, Result};
use crate::ml::models::ModelType;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Trait for fitted binary classifiers
pub trait Classifier: Send + Sync {
    /// Predict class probabilities, one row per sample: `[P(class 0), P(class 1)]`
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Predict class labels (arg-max of the probability row, ties to class 0)
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(features)?;
        Ok(proba
            .axis_iter(Axis(0))
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (idx, &p)| {
                        if p > best.1 {
                            (idx, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Number of input columns
    fn n_features(&self) -> usize;

    /// Column names seen at fit time, if the model was fit with names
    fn feature_names_in(&self) -> Option<&[String]>;
}

/// Serialized classifier, as exported by the training process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionClassifier),
    RandomForest(RandomForestClassifier),
    GradientBoosting(GradientBoostingClassifier),
}

impl ClassifierArtifact {
    /// Validate the fitted parameters and hand back the classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>> {
        Ok(match self {
            ClassifierArtifact::LogisticRegression(model) => {
                model.validate()?;
                Box::new(model)
            }
            ClassifierArtifact::RandomForest(model) => {
                model.validate()?;
                Box::new(model)
            }
            ClassifierArtifact::GradientBoosting(model) => {
                model.validate()?;
                Box::new(model)
            }
        })
    }
}

/// Binary logistic regression: `P(churn) = sigmoid(x . coef + intercept)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegressionClassifier {
    fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(AppError::SchemaMismatch(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        check_names_len(&self.feature_names_in, self.coef.len())
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_input(features, self.n_features(), &self.feature_names_in)?;

        let coef = Array1::from(self.coef.clone());
        let churn = features.dot(&coef).mapv(|z| sigmoid(z + self.intercept));
        Ok(binary_proba(&churn))
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        non_empty(&self.feature_names_in)
    }
}

/// One fitted tree in array form: node `i` is a leaf when
/// `children_left[i] == -1`; otherwise go left when
/// `x[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node output: class weights for forests, a single value for boosting
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, value_width: usize) -> Result<()> {
        let n = self.children_left.len();
        if n == 0
            || self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(AppError::SchemaMismatch(
                "tree arrays are empty or of unequal length".to_string(),
            ));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == -1 {
                if self.value[node].len() != value_width {
                    return Err(AppError::SchemaMismatch(format!(
                        "tree leaf {} has {} outputs, expected {}",
                        node,
                        self.value[node].len(),
                        value_width
                    )));
                }
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(AppError::SchemaMismatch(format!(
                    "tree node {} has invalid children",
                    node
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(AppError::SchemaMismatch(format!(
                    "tree node {} splits on feature {} of {}",
                    node, feature, n_features
                )));
            }
        }

        Ok(())
    }

    /// Output of the leaf `x` lands in
    fn leaf(&self, x: ArrayView1<f64>) -> &[f64] {
        let mut node = 0;
        // Children always point forward, so this terminates.
        while self.children_left[node] != -1 {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// Forest of classification trees; probabilities are the mean of each
/// tree's normalized leaf class weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(AppError::SchemaMismatch("random forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, 2)?;
        }
        check_names_len(&self.feature_names_in, self.n_features)
    }
}

impl Classifier for RandomForestClassifier {
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_input(features, self.n_features, &self.feature_names_in)?;

        let churn = features
            .axis_iter(Axis(0))
            .map(|row| {
                let total: f64 = self
                    .trees
                    .iter()
                    .map(|tree| {
                        let leaf = tree.leaf(row);
                        let weight: f64 = leaf.iter().sum();
                        if weight > 0.0 {
                            leaf[1] / weight
                        } else {
                            0.0
                        }
                    })
                    .sum();
                total / self.trees.len() as f64
            })
            .collect::<Array1<f64>>();

        Ok(binary_proba(&churn))
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        non_empty(&self.feature_names_in)
    }
}

/// Gradient-boosted regression trees on the log-odds scale:
/// `P(churn) = sigmoid(init + learning_rate * sum(leaf))`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub n_features: usize,
    /// Initial raw prediction (log-odds of the prior)
    pub init: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTree>,
}

impl GradientBoostingClassifier {
    fn validate(&self) -> Result<()> {
        for tree in &self.trees {
            tree.validate(self.n_features, 1)?;
        }
        check_names_len(&self.feature_names_in, self.n_features)
    }
}

impl Classifier for GradientBoostingClassifier {
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_input(features, self.n_features, &self.feature_names_in)?;

        let churn = features
            .axis_iter(Axis(0))
            .map(|row| {
                let boost: f64 = self.trees.iter().map(|tree| tree.leaf(row)[0]).sum();
                sigmoid(self.init + self.learning_rate * boost)
            })
            .collect::<Array1<f64>>();

        Ok(binary_proba(&churn))
    }

    fn model_type(&self) -> ModelType {
        ModelType::GradientBoosting
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names_in(&self) -> Option<&[String]> {
        non_empty(&self.feature_names_in)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Stack `[1 - p, p]` per row
fn binary_proba(churn: &Array1<f64>) -> Array2<f64> {
    let mut proba = Array2::zeros((churn.len(), 2));
    for (i, &p) in churn.iter().enumerate() {
        proba[[i, 0]] = 1.0 - p;
        proba[[i, 1]] = p;
    }
    proba
}

fn non_empty(names: &[String]) -> Option<&[String]> {
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn check_names_len(names: &[String], n_features: usize) -> Result<()> {
    if !names.is_empty() && names.len() != n_features {
        return Err(AppError::SchemaMismatch(format!(
            "model lists {} feature names for {} features",
            names.len(),
            n_features
        )));
    }
    Ok(())
}

/// Reject rows of the wrong width or holding non-finite values
fn check_input(features: &Array2<f64>, n_features: usize, names: &[String]) -> Result<()> {
    if features.ncols() != n_features {
        return Err(AppError::SchemaMismatch(format!(
            "model expects {} features, got {}",
            n_features,
            features.ncols()
        )));
    }

    if let Some((_, col)) = features
        .indexed_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(idx, _)| idx)
    {
        let column = names
            .get(col)
            .cloned()
            .unwrap_or_else(|| format!("feature {}", col));
        return Err(AppError::MissingValue { column });
    }

    Ok(())
}
