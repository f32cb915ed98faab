//! Credit Card Fraud Scoring Form
//!
//! Collects transaction details from a single-page form, derives the
//! feature record the trained pipeline expects, and reports the model's
//! fraud probability with a binary verdict.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod lookup;
pub mod models;
pub mod predictor;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::FormError;
pub use feature_extractor::{FeatureExtractor, FeatureRecord, FeatureSettings};
pub use lookup::LookupTables;
pub use models::{FraudClassifier, OnnxClassifier};
pub use predictor::Predictor;
pub use types::{PredictionOutcome, PredictionResult, RawInput, Verdict};
