//! Classifier seam

use crate::feature_extractor::FeatureRecord;
use anyhow::Result;

/// A trained model that scores one feature record.
///
/// Implementations are loaded once and shared read-only across requests.
pub trait FraudClassifier: Send + Sync {
    /// Name used in logs and the health endpoint
    fn name(&self) -> &str;

    /// Probability of the positive (fraud) class.
    fn predict_probability(&self, record: &FeatureRecord) -> Result<f64>;
}
