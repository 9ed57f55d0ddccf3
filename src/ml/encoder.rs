use crate::error::{AppError, Result};
use crate::ml::features::{FeatureRow, FeatureValue, FeatureVector, CATEGORICAL_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fitted one-hot encoder for the categorical columns.
///
/// The vocabulary is fixed at fit time. Output columns are
/// `<column>_<category>` per kept category, column by column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderArtifact {
    /// Columns seen at fit time; empty when fit without names
    #[serde(default)]
    pub feature_names_in: Vec<String>,

    /// Category vocabulary per input column, in output order
    pub categories: Vec<Vec<String>>,

    /// Index of the dropped category per column; empty when nothing is dropped
    #[serde(default)]
    pub drop_idx: Vec<Option<usize>>,
}

impl OneHotEncoderArtifact {
    /// Check the fitted parameters against the categorical column set
    pub fn validate(&self) -> Result<()> {
        if self.categories.len() != CATEGORICAL_COLUMNS.len() {
            return Err(AppError::SchemaMismatch(format!(
                "encoder was fit on {} columns, expected {}",
                self.categories.len(),
                CATEGORICAL_COLUMNS.len()
            )));
        }

        if !self.feature_names_in.is_empty()
            && self
                .feature_names_in
                .iter()
                .map(String::as_str)
                .ne(CATEGORICAL_COLUMNS)
        {
            return Err(AppError::SchemaMismatch(format!(
                "encoder was fit on columns {:?}, expected {:?}",
                self.feature_names_in, CATEGORICAL_COLUMNS
            )));
        }

        if !self.drop_idx.is_empty() {
            if self.drop_idx.len() != self.categories.len() {
                return Err(AppError::SchemaMismatch(
                    "encoder drop_idx does not cover every column".to_string(),
                ));
            }
            for (drop, vocabulary) in self.drop_idx.iter().zip(&self.categories) {
                if matches!(drop, Some(idx) if *idx >= vocabulary.len()) {
                    return Err(AppError::SchemaMismatch(
                        "encoder drop_idx points past its vocabulary".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    fn dropped(&self, column: usize) -> Option<usize> {
        self.drop_idx.get(column).copied().flatten()
    }

    /// Output column names, in output order
    pub fn feature_names_out(&self) -> Vec<String> {
        CATEGORICAL_COLUMNS
            .iter()
            .zip(&self.categories)
            .enumerate()
            .flat_map(|(i, (column, vocabulary))| {
                let dropped = self.dropped(i);
                vocabulary
                    .iter()
                    .enumerate()
                    .filter(move |(j, _)| Some(*j) != dropped)
                    .map(move |(_, category)| format!("{}_{}", column, category))
            })
            .collect()
    }

    /// Vocabulary per input column
    pub fn vocabulary(&self) -> BTreeMap<String, Vec<String>> {
        CATEGORICAL_COLUMNS
            .iter()
            .zip(&self.categories)
            .map(|(column, vocabulary)| (column.to_string(), vocabulary.clone()))
            .collect()
    }

    /// Encode the categorical columns of `row`.
    ///
    /// Fails with [`AppError::UnseenCategory`] for any value outside the
    /// fitted vocabulary, including a missing value.
    pub fn transform(&self, row: &FeatureRow) -> Result<FeatureVector> {
        self.validate()?;

        let cells = row.select(&CATEGORICAL_COLUMNS)?;
        let mut values = Vec::new();

        for (i, (cell, column)) in cells.into_iter().zip(CATEGORICAL_COLUMNS).enumerate() {
            let vocabulary = &self.categories[i];
            let hit = match cell {
                FeatureValue::Categorical(value) => {
                    vocabulary.iter().position(|c| c == value).ok_or_else(|| {
                        AppError::UnseenCategory {
                            column: column.to_string(),
                            value: value.clone(),
                        }
                    })?
                }
                FeatureValue::Missing => {
                    return Err(AppError::UnseenCategory {
                        column: column.to_string(),
                        value: cell.to_string(),
                    })
                }
                FeatureValue::Numeric(x) => {
                    return Err(AppError::SchemaMismatch(format!(
                        "categorical column {} holds number {}",
                        column, x
                    )))
                }
            };

            let dropped = self.dropped(i);
            values.extend(
                (0..vocabulary.len())
                    .filter(|j| Some(*j) != dropped)
                    .map(|j| if j == hit { 1.0 } else { 0.0 }),
            );
        }

        FeatureVector::new(self.feature_names_out(), values)
    }
}
