use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

/// Declared input domains. The `validate(range)` attributes on
/// [`CustomerProfile`] carry the same bounds.
pub const CREDIT_SCORE_RANGE: RangeInclusive<u32> = 50..=1000;
pub const AGE_RANGE: RangeInclusive<u32> = 18..=92;
pub const TENURE_RANGE: RangeInclusive<u32> = 0..=12;
pub const BALANCE_RANGE: RangeInclusive<f64> = 0.0..=250898.09;
pub const NUM_OF_PRODUCTS_RANGE: RangeInclusive<u32> = 1..=4;
pub const ESTIMATED_SALARY_RANGE: RangeInclusive<f64> = 11.58..=199992.48;
pub const NAME_MAX_CHARS: u64 = 50;

/// Customer profile as captured by the form, one field per control.
///
/// Select fields are optional: an unselected control is `None`, not a default
/// option. Only per-field domains are checked here; an unset Geography or
/// Gender is carried through and rejected by the categorical encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerProfile {
    /// Display name used in the verdict
    #[serde(default)]
    #[validate(length(max = 50))]
    pub name: String,

    #[validate(range(min = 50, max = 1000))]
    pub credit_score: u32,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub geography: Option<Geography>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub gender: Option<Gender>,

    #[validate(range(min = 18, max = 92))]
    pub age: u32,

    /// Years with the bank
    #[validate(range(min = 0, max = 12))]
    pub tenure: u32,

    #[validate(range(min = 0.0, max = 250898.09), custom(function = "finite"))]
    pub balance: f64,

    #[validate(range(min = 1, max = 4))]
    pub num_of_products: u32,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub has_cr_card: Option<YesNo>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_active_member: Option<YesNo>,

    #[validate(range(min = 11.58, max = 199992.48), custom(function = "finite"))]
    pub estimated_salary: f64,
}

/// Country of residence
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
pub enum Geography {
    France,
    Spain,
    Germany,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
pub enum Gender {
    Female,
    Male,
}

/// Yes/no answer to a select control
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Binary encoding used by the model: yes = 1, no = 0
    pub fn as_flag(self) -> u8 {
        match self {
            YesNo::Yes => 1,
            YesNo::No => 0,
        }
    }
}

/// NaN compares false against both bounds, so `range` alone lets it through.
fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

/// Treat an empty select value (or JSON null) as unset, otherwise parse the
/// option by name.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid option '{}': {}", value, e))),
    }
}
