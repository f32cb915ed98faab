//! Feature derivation for fraud model inference.
//!
//! Turns a form submission into the exact column set the trained pipeline
//! was fitted on. Scaling and one-hot encoding live inside the exported
//! model, so categorical columns are passed as raw dataset codes.

use crate::error::Result;
use crate::lookup::LookupTables;
use crate::types::input::RawInput;
use serde::{Deserialize, Serialize};

/// Column names in the order the classifier expects them.
pub const FEATURE_NAMES: [&str; 13] = [
    // Raw numeric (5)
    "amt",
    "transaction_hour",
    "transaction_day",
    "transaction_month",
    "customer_age",
    // Engineered (5)
    "is_night",
    "is_high_amount",
    "log_amt",
    "amt_to_mean",
    "city_pop",
    // Categorical (3)
    "category",
    "gender",
    "state",
];

/// Constants baked into the training-time feature schema.
///
/// `amount_mean_divisor` and `placeholder_city_pop` are stand-ins the form
/// cannot observe (population mean amount, cardholder city size); they are
/// kept configurable rather than derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Hours of day flagged as night-time
    pub night_hours: Vec<u8>,
    /// Amounts strictly above this are flagged as high
    pub high_amount_cutoff: f64,
    /// Divisor for `amt_to_mean`
    pub amount_mean_divisor: f64,
    /// Value used for `city_pop` on every submission
    pub placeholder_city_pop: i64,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            night_hours: vec![22, 23, 0, 1, 2, 3, 4, 5],
            high_amount_cutoff: 500.0,
            amount_mean_divisor: 200.0,
            placeholder_city_pop: 1000,
        }
    }
}

/// Model-facing codes for the three categorical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatedCodes {
    pub category: &'static str,
    pub gender: &'static str,
    pub state: &'static str,
}

/// One row of classifier input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub amt: f64,
    pub transaction_hour: i64,
    pub transaction_day: i64,
    pub transaction_month: i64,
    pub customer_age: i64,
    pub is_night: u8,
    pub is_high_amount: u8,
    pub log_amt: f64,
    pub amt_to_mean: f64,
    pub city_pop: i64,
    pub category: String,
    pub gender: String,
    pub state: String,
}

/// Storage type of a feature column as the training frame held it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

/// One column value, keeping its training-time type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Integer(i64),
    Real(f64),
    Text(&'a str),
}

impl FeatureValue<'_> {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FeatureValue::Integer(_) => ColumnKind::Integer,
            FeatureValue::Real(_) => ColumnKind::Real,
            FeatureValue::Text(_) => ColumnKind::Text,
        }
    }
}

impl FeatureRecord {
    /// All columns as (name, typed value), in schema order.
    pub fn columns(&self) -> [(&'static str, FeatureValue<'_>); 13] {
        [
            ("amt", FeatureValue::Real(self.amt)),
            ("transaction_hour", FeatureValue::Integer(self.transaction_hour)),
            ("transaction_day", FeatureValue::Integer(self.transaction_day)),
            ("transaction_month", FeatureValue::Integer(self.transaction_month)),
            ("customer_age", FeatureValue::Integer(self.customer_age)),
            ("is_night", FeatureValue::Integer(i64::from(self.is_night))),
            ("is_high_amount", FeatureValue::Integer(i64::from(self.is_high_amount))),
            ("log_amt", FeatureValue::Real(self.log_amt)),
            ("amt_to_mean", FeatureValue::Real(self.amt_to_mean)),
            ("city_pop", FeatureValue::Integer(self.city_pop)),
            ("category", FeatureValue::Text(&self.category)),
            ("gender", FeatureValue::Text(&self.gender)),
            ("state", FeatureValue::Text(&self.state)),
        ]
    }
}

/// Column kind for each entry of [`FEATURE_NAMES`], in the same order.
pub const FEATURE_KINDS: [ColumnKind; 13] = [
    ColumnKind::Real,
    ColumnKind::Integer,
    ColumnKind::Integer,
    ColumnKind::Integer,
    ColumnKind::Integer,
    ColumnKind::Integer,
    ColumnKind::Integer,
    ColumnKind::Real,
    ColumnKind::Real,
    ColumnKind::Integer,
    ColumnKind::Text,
    ColumnKind::Text,
    ColumnKind::Text,
];

/// Builds [`FeatureRecord`]s from form submissions.
///
/// Holds the lookup tables and feature constants, both fixed after startup.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    settings: FeatureSettings,
    tables: LookupTables,
}

impl FeatureExtractor {
    pub fn new(settings: FeatureSettings, tables: LookupTables) -> Self {
        Self { settings, tables }
    }

    pub fn settings(&self) -> &FeatureSettings {
        &self.settings
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Translate display values into model codes.
    pub fn translate(&self, input: &RawInput) -> Result<TranslatedCodes> {
        Ok(TranslatedCodes {
            category: self.tables.category_code(&input.category)?,
            gender: self.tables.gender_code(&input.gender),
            state: self.tables.state_code(&input.state)?,
        })
    }

    /// Translate and derive in one step.
    pub fn extract(&self, input: &RawInput) -> Result<FeatureRecord> {
        let codes = self.translate(input)?;
        Ok(self.build(input, &codes))
    }

    /// Derive the feature record. Total for any numeric input.
    pub fn build(&self, input: &RawInput, codes: &TranslatedCodes) -> FeatureRecord {
        FeatureRecord {
            amt: input.amount,
            transaction_hour: input.hour,
            transaction_day: input.day,
            transaction_month: input.month,
            customer_age: input.age,
            is_night: self.is_night(input.hour) as u8,
            is_high_amount: self.is_high_amount(input.amount) as u8,
            log_amt: input.amount.ln_1p(),
            amt_to_mean: input.amount / self.settings.amount_mean_divisor,
            city_pop: self.settings.placeholder_city_pop,
            category: codes.category.to_string(),
            gender: codes.gender.to_string(),
            state: codes.state.to_string(),
        }
    }

    pub fn is_night(&self, hour: i64) -> bool {
        self.settings
            .night_hours
            .iter()
            .any(|&night| i64::from(night) == hour)
    }

    pub fn is_high_amount(&self, amount: f64) -> bool {
        amount > self.settings.high_amount_cutoff
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    /// Get feature names (matching training order).
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureSettings::default(), LookupTables::new())
    }
}
