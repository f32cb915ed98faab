//! Submission scoring: features, classifier call, and the fraud decision

use crate::config::AppConfig;
use crate::error::{FormError, Result};
use crate::feature_extractor::{FeatureExtractor, FeatureRecord};
use crate::lookup::LookupTables;
use crate::models::FraudClassifier;
use crate::types::{PredictionOutcome, PredictionResult, RawInput};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Scores form submissions against a shared read-only classifier.
///
/// Holds no per-request state; every call is independent.
pub struct Predictor {
    extractor: FeatureExtractor,
    classifier: Arc<dyn FraudClassifier>,
    threshold: f64,
}

impl Predictor {
    pub fn new(
        extractor: FeatureExtractor,
        classifier: Arc<dyn FraudClassifier>,
        threshold: f64,
    ) -> Self {
        Self {
            extractor,
            classifier,
            threshold,
        }
    }

    /// Wire a predictor from configuration around an already loaded classifier
    pub fn from_config(config: &AppConfig, classifier: Arc<dyn FraudClassifier>) -> Self {
        let extractor = FeatureExtractor::new(config.features.clone(), LookupTables::new());
        Self::new(extractor, classifier, config.detection.threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Run the classifier on a record and apply the threshold.
    ///
    /// Any classifier failure, and any probability outside [0, 1], becomes
    /// [`FormError::Prediction`].
    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult> {
        let probability = self
            .classifier
            .predict_probability(record)
            .map_err(|e| FormError::Prediction(format!("{e:#}")))?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(FormError::Prediction(format!(
                "classifier returned invalid probability {probability}"
            )));
        }

        Ok(PredictionResult::new(probability, self.threshold))
    }

    /// Validate, translate, derive features, and predict.
    pub fn evaluate(&self, input: &RawInput) -> Result<PredictionResult> {
        input.validate()?;
        let record = self.extractor.extract(input)?;
        debug!(record = ?record, "Features derived");
        self.predict(&record)
    }

    /// Score a submission, turning every failure into a user-visible message.
    pub fn score(&self, input: &RawInput) -> PredictionOutcome {
        match self.evaluate(input) {
            Ok(result) => {
                info!(
                    request_id = %result.request_id,
                    label = %result.label,
                    probability = result.probability,
                    model = %self.classifier.name(),
                    "Transaction scored"
                );
                PredictionOutcome::Predicted(result)
            }
            Err(e) => {
                match &e {
                    FormError::Prediction(_) => {
                        error!(model = %self.classifier.name(), error = %e, "Prediction failed")
                    }
                    _ => info!(error = %e, "Submission rejected"),
                }
                PredictionOutcome::Failed {
                    message: e.user_message(),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Verdict;

    /// Returns a fixed probability regardless of input.
    pub(crate) struct FixedClassifier(pub f64);

    impl FraudClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_probability(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    /// Fails every call, like a model whose inputs do not match the schema.
    pub(crate) struct BrokenClassifier;

    impl FraudClassifier for BrokenClassifier {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict_probability(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            anyhow::bail!("input 'city_pop' has wrong type")
        }
    }

    fn predictor(classifier: impl FraudClassifier + 'static) -> Predictor {
        Predictor::from_config(&AppConfig::default(), Arc::new(classifier))
    }

    #[test]
    fn test_decision_boundary() {
        let record = FeatureExtractor::default()
            .extract(&RawInput::default())
            .unwrap();

        let at_threshold = predictor(FixedClassifier(0.5)).predict(&record).unwrap();
        assert_eq!(at_threshold.label, Verdict::Fraud);
        assert_eq!(at_threshold.percent, 50);

        let below = predictor(FixedClassifier(0.499999)).predict(&record).unwrap();
        assert_eq!(below.label, Verdict::Legitimate);
        assert_eq!(below.percent, 49);
    }

    #[test]
    fn test_percent_truncates() {
        match predictor(FixedClassifier(0.567)).score(&RawInput::default()) {
            PredictionOutcome::Predicted(result) => {
                assert_eq!(result.percent, 56);
                assert_eq!(result.label, Verdict::Fraud);
            }
            PredictionOutcome::Failed { message } => panic!("unexpected failure: {message}"),
        }
    }

    #[test]
    fn test_classifier_error_becomes_message() {
        let outcome = predictor(BrokenClassifier).score(&RawInput::default());
        assert!(outcome.result().is_none());
        match outcome {
            PredictionOutcome::Failed { message } => {
                assert_eq!(message, "Error: input 'city_pop' has wrong type");
            }
            PredictionOutcome::Predicted(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let err = predictor(FixedClassifier(1.2))
            .evaluate(&RawInput::default())
            .unwrap_err();
        assert!(matches!(err, FormError::Prediction(_)));

        let err = predictor(FixedClassifier(f64::NAN))
            .evaluate(&RawInput::default())
            .unwrap_err();
        assert!(matches!(err, FormError::Prediction(_)));
    }

    #[test]
    fn test_bad_input_never_reaches_classifier() {
        let input = RawInput {
            category: "Groceries".to_string(),
            ..RawInput::default()
        };
        // BrokenClassifier would produce a different message if called
        match predictor(BrokenClassifier).score(&input) {
            PredictionOutcome::Failed { message } => {
                assert_eq!(message, "Error: Unknown category: Groceries");
            }
            PredictionOutcome::Predicted(_) => panic!("expected failure"),
        }

        let input = RawInput {
            month: 13,
            ..RawInput::default()
        };
        assert!(matches!(
            predictor(FixedClassifier(0.1)).evaluate(&input),
            Err(FormError::InputOutOfRange { field: "month", .. })
        ));
    }

    #[test]
    fn test_submissions_are_independent() {
        let predictor = predictor(FixedClassifier(0.9));
        let first = predictor.score(&RawInput::default());
        let second = predictor.score(&RawInput::default());
        let (first, second) = (first.result().unwrap(), second.result().unwrap());
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(first.probability, second.probability);
    }
}
