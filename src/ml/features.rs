use crate::error::{AppError, Result};
use crate::models::{CustomerProfile, YesNo};
use serde::Serialize;
use std::fmt;

/// Columns of the assembled row, in order
pub const ROW_COLUMNS: [&str; 10] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Columns the scaler was fit on, in order
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "CreditScore",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Columns the encoder was fit on, in order
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["Geography", "Gender"];

/// One cell of the assembled row
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
    Missing,
}

impl FeatureValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Categorical(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(value) => write!(f, "{}", value),
            FeatureValue::Categorical(value) => f.write_str(value),
            FeatureValue::Missing => f.write_str("<missing>"),
        }
    }
}

/// Canonical single-row record handed to preprocessing
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    /// Map a captured profile to the canonical row.
    ///
    /// HasCrCard and IsActiveMember become 1/0; an unset select becomes
    /// [`FeatureValue::Missing`]. Nothing else is transformed.
    pub fn assemble(profile: &CustomerProfile) -> Self {
        let columns = vec![
            ("CreditScore", FeatureValue::Numeric(f64::from(profile.credit_score))),
            ("Geography", category(profile.geography.map(|g| g.to_string()))),
            ("Gender", category(profile.gender.map(|g| g.to_string()))),
            ("Age", FeatureValue::Numeric(f64::from(profile.age))),
            ("Tenure", FeatureValue::Numeric(f64::from(profile.tenure))),
            ("Balance", FeatureValue::Numeric(profile.balance)),
            ("NumOfProducts", FeatureValue::Numeric(f64::from(profile.num_of_products))),
            ("HasCrCard", flag(profile.has_cr_card)),
            ("IsActiveMember", flag(profile.is_active_member)),
            ("EstimatedSalary", FeatureValue::Numeric(profile.estimated_salary)),
        ];

        Self { columns }
    }

    /// Column names in row order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    /// Look up a cell by column name
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    /// Project the row onto `columns`, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Vec<&FeatureValue>> {
        columns
            .iter()
            .map(|column| {
                self.get(column).ok_or_else(|| {
                    AppError::SchemaMismatch(format!("assembled row has no column {}", column))
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn category(value: Option<String>) -> FeatureValue {
    match value {
        Some(value) => FeatureValue::Categorical(value),
        None => FeatureValue::Missing,
    }
}

fn flag(value: Option<YesNo>) -> FeatureValue {
    match value {
        Some(answer) => FeatureValue::Numeric(f64::from(answer.as_flag())),
        None => FeatureValue::Missing,
    }
}

/// Fully numeric row produced by preprocessing, with its column names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(AppError::Internal(format!(
                "feature vector has {} names but {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    /// Side-by-side concatenation (`self ++ other`)
    pub fn concat(mut self, other: FeatureVector) -> Self {
        self.names.extend(other.names);
        self.values.extend(other.values);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First column holding a non-finite value, if any
    pub fn first_non_finite(&self) -> Option<&str> {
        self.values
            .iter()
            .position(|v| !v.is_finite())
            .map(|idx| self.names[idx].as_str())
    }
}
