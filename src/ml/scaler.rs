use crate::error::{AppError, Result};
use crate::ml::features::{FeatureRow, FeatureValue, FeatureVector, NUMERIC_COLUMNS};
use crate::ml::models::ScalerType;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fitted numeric scaler, as exported by the training process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard(StandardScaler),
    /// `x * scale + min`
    MinMax(MinMaxScaler),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Columns seen at fit time; empty when fit without names
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    pub fn scaler_type(&self) -> ScalerType {
        match self {
            ScalerArtifact::Standard(_) => ScalerType::Standard,
            ScalerArtifact::MinMax(_) => ScalerType::MinMax,
        }
    }

    fn feature_names_in(&self) -> &[String] {
        match self {
            ScalerArtifact::Standard(s) => &s.feature_names_in,
            ScalerArtifact::MinMax(s) => &s.feature_names_in,
        }
    }

    /// Check the fitted parameters against the numeric column set
    pub fn validate(&self) -> Result<()> {
        let expected = NUMERIC_COLUMNS.len();
        let (a, b) = match self {
            ScalerArtifact::Standard(s) => (s.mean.len(), s.scale.len()),
            ScalerArtifact::MinMax(s) => (s.min.len(), s.scale.len()),
        };

        if a != expected || b != expected {
            return Err(AppError::SchemaMismatch(format!(
                "scaler was fit on {} columns, expected {}",
                a.max(b),
                expected
            )));
        }

        let names = self.feature_names_in();
        if !names.is_empty() && names.iter().map(String::as_str).ne(NUMERIC_COLUMNS) {
            return Err(AppError::SchemaMismatch(format!(
                "scaler was fit on columns {:?}, expected {:?}",
                names, NUMERIC_COLUMNS
            )));
        }

        Ok(())
    }

    /// Scale the numeric columns of `row`.
    ///
    /// A missing cell becomes NaN and stays NaN after scaling.
    pub fn transform(&self, row: &FeatureRow) -> Result<FeatureVector> {
        self.validate()?;

        let raw = row
            .select(&NUMERIC_COLUMNS)?
            .into_iter()
            .zip(NUMERIC_COLUMNS)
            .map(|(value, column)| match value {
                FeatureValue::Numeric(x) => Ok(*x),
                FeatureValue::Missing => Ok(f64::NAN),
                FeatureValue::Categorical(v) => Err(AppError::SchemaMismatch(format!(
                    "numeric column {} holds category '{}'",
                    column, v
                ))),
            })
            .collect::<Result<Vec<f64>>>()?;
        let x = Array1::from(raw);

        let scaled = match self {
            ScalerArtifact::Standard(s) => {
                let mean = Array1::from(s.mean.clone());
                let scale = Array1::from(s.scale.clone()).mapv(non_zero);
                (&x - &mean) / &scale
            }
            ScalerArtifact::MinMax(s) => {
                let min = Array1::from(s.min.clone());
                let scale = Array1::from(s.scale.clone());
                &x * &scale + &min
            }
        };

        FeatureVector::new(
            NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            scaled.to_vec(),
        )
    }
}

// Constant columns are fit with scale 0; treat as 1 like sklearn does.
fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}
