use crate::error::{AppError, Result};
use crate::metrics::{PREDICTIONS_TOTAL, PREDICTION_DURATION_SECONDS, PREDICTION_ERRORS_TOTAL};
use crate::ml::artifacts::{ArtifactStore, Artifacts};
use crate::ml::features::{FeatureRow, FeatureVector};
use crate::ml::models::{ChurnLabel, ChurnPrediction, ModelMetadata};
use crate::models::CustomerProfile;
use ndarray::Array2;
use std::time::Instant;
use tracing::{debug, info, warn};
use validator::Validate;

/// Runs intake → assembly → preprocessing → prediction for one profile
pub struct PredictionService {
    store: ArtifactStore,
}

impl PredictionService {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Predict churn for one customer profile.
    ///
    /// Every failure aborts the request; nothing is retried.
    pub fn predict(&self, profile: &CustomerProfile) -> Result<ChurnPrediction> {
        let start = Instant::now();
        let result = self.run(profile);
        let elapsed = start.elapsed();

        match &result {
            Ok(prediction) => {
                PREDICTIONS_TOTAL
                    .with_label_values(&[&prediction.label.to_string()])
                    .inc();
                PREDICTION_DURATION_SECONDS.observe(elapsed.as_secs_f64());
                info!(
                    label = %prediction.label,
                    probability_churn = prediction.probability_churn,
                    duration_ms = elapsed.as_millis() as u64,
                    "Prediction completed"
                );
            }
            Err(e) => {
                PREDICTION_ERRORS_TOTAL
                    .with_label_values(&[e.error_code()])
                    .inc();
                warn!(error_code = e.error_code(), "Prediction failed: {}", e);
            }
        }

        result
    }

    fn run(&self, profile: &CustomerProfile) -> Result<ChurnPrediction> {
        profile.validate()?;

        let artifacts = self.store.get()?;
        let row = FeatureRow::assemble(profile);
        debug!(columns = row.len(), "Assembled feature row");

        let features = preprocess(&artifacts, &row)?;
        debug!(n_features = features.len(), "Preprocessed feature row");

        predict_row(&artifacts, &features)
    }

    /// Description of the artifacts a request would use
    pub fn metadata(&self) -> Result<ModelMetadata> {
        Ok(self.store.get()?.metadata())
    }

    /// Whether the artifacts can currently be loaded
    pub fn is_ready(&self) -> bool {
        self.store.get().is_ok()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

/// Scale the numeric columns, encode the categorical ones, concatenate
pub fn preprocess(artifacts: &Artifacts, row: &FeatureRow) -> Result<FeatureVector> {
    let scaled = artifacts.scaler.transform(row)?;
    let encoded = artifacts.encoder.transform(row)?;
    Ok(scaled.concat(encoded))
}

/// Run the classifier on one preprocessed row
pub fn predict_row(artifacts: &Artifacts, features: &FeatureVector) -> Result<ChurnPrediction> {
    if let Some(expected) = artifacts.model.feature_names_in() {
        if expected != features.names.as_slice() {
            return Err(AppError::SchemaMismatch(format!(
                "model was fit on columns {:?}, got {:?}",
                expected, features.names
            )));
        }
    }

    if let Some(column) = features.first_non_finite() {
        return Err(AppError::MissingValue {
            column: column.to_string(),
        });
    }

    let x = Array2::from_shape_vec((1, features.len()), features.values.clone())
        .map_err(|e| AppError::Internal(format!("Failed to create feature array: {}", e)))?;

    let labels = artifacts.model.predict(&x)?;
    let proba = artifacts.model.predict_proba(&x)?;

    let label = labels
        .first()
        .copied()
        .and_then(ChurnLabel::from_class_index)
        .ok_or_else(|| AppError::Internal("model returned no usable label".to_string()))?;

    Ok(ChurnPrediction::new(label, proba[[0, 1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::LogisticRegressionClassifier;
    use crate::ml::encoder::OneHotEncoderArtifact;
    use crate::ml::scaler::{ScalerArtifact, StandardScaler};
    use crate::models::{Gender, Geography, YesNo};
    use std::sync::Arc;

    fn artifacts(coef: Vec<f64>, intercept: f64, names: Vec<String>) -> Artifacts {
        Artifacts::from_parts(
            ScalerArtifact::Standard(StandardScaler {
                feature_names_in: vec![],
                mean: vec![650.0, 40.0, 5.0, 50000.0, 2.0, 0.5, 0.5, 60000.0],
                scale: vec![100.0, 10.0, 3.0, 60000.0, 1.0, 0.5, 0.5, 50000.0],
            }),
            OneHotEncoderArtifact {
                feature_names_in: vec![],
                categories: vec![
                    vec!["France".into(), "Germany".into(), "Spain".into()],
                    vec!["Female".into(), "Male".into()],
                ],
                drop_idx: vec![],
            },
            Box::new(LogisticRegressionClassifier {
                feature_names_in: names,
                coef,
                intercept,
            }),
        )
    }

    fn service(artifacts: Artifacts) -> PredictionService {
        PredictionService::new(ArtifactStore::Cached(Arc::new(artifacts)))
    }

    fn profile() -> CustomerProfile {
        CustomerProfile {
            name: "prince".to_string(),
            credit_score: 650,
            geography: Some(Geography::Germany),
            gender: Some(Gender::Female),
            age: 40,
            tenure: 5,
            balance: 50000.0,
            num_of_products: 2,
            has_cr_card: Some(YesNo::Yes),
            is_active_member: Some(YesNo::No),
            estimated_salary: 60000.0,
        }
    }

    #[test]
    fn test_pinned_prediction() {
        // Only Geography_Germany carries weight.
        let mut coef = vec![0.0; 13];
        coef[9] = 2.0;
        let service = service(artifacts(coef, -1.0, vec![]));

        let prediction = service.predict(&profile()).unwrap();
        let expected = 1.0 / (1.0 + (-1.0f64).exp());

        assert_eq!(prediction.label, ChurnLabel::Churn);
        assert!((prediction.probability_churn - expected).abs() < 1e-12);
        assert!((prediction.probability_stay - (1.0 - expected)).abs() < 1e-12);
    }

    #[test]
    fn test_preprocess_concatenates_scaled_and_encoded() {
        let artifacts = artifacts(vec![0.0; 13], 0.0, vec![]);
        let row = FeatureRow::assemble(&profile());
        let features = preprocess(&artifacts, &row).unwrap();

        assert_eq!(features.names, artifacts.feature_names());
        assert_eq!(&features.values[8..], &[0.0, 1.0, 0.0, 1.0, 0.0]);
        assert!((features.values[5] - 1.0).abs() < 1e-12);
        assert!((features.values[6] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation_error_before_loading() {
        let service = service(artifacts(vec![0.0; 13], 0.0, vec![]));
        let mut profile = profile();
        profile.age = 10;

        assert!(matches!(
            service.predict(&profile),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unset_flag_is_missing_value() {
        let service = service(artifacts(vec![0.0; 13], 0.0, vec![]));
        let mut profile = profile();
        profile.has_cr_card = None;

        let err = service.predict(&profile).unwrap_err();
        assert!(matches!(err, AppError::MissingValue { ref column } if column == "HasCrCard"));
    }

    #[test]
    fn test_feature_name_mismatch() {
        let mut names = artifacts(vec![0.0; 13], 0.0, vec![]).feature_names();
        names.swap(8, 9);
        let service = service(artifacts(vec![0.0; 13], 0.0, names));

        assert!(matches!(
            service.predict(&profile()),
            Err(AppError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_matching_feature_names_accepted() {
        let names = artifacts(vec![0.0; 13], 0.0, vec![]).feature_names();
        let service = service(artifacts(vec![0.0; 13], 0.0, names));
        assert!(service.predict(&profile()).is_ok());
    }

    #[test]
    fn test_width_mismatch() {
        let service = service(artifacts(vec![0.0; 12], 0.0, vec![]));
        assert!(matches!(
            service.predict(&profile()),
            Err(AppError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_metadata_and_readiness() {
        let service = service(artifacts(vec![0.0; 13], 0.0, vec![]));
        assert!(service.is_ready());
        assert_eq!(service.metadata().unwrap().n_features, 13);
        assert!(service.store().is_cached());
    }
}
