//! Sample Submission Scorer
//!
//! Generates randomized form submissions and scores them with the configured
//! model. Falls back to a dry run that prints derived features when the model
//! cannot be loaded.

use card_fraud_form::{
    config::AppConfig,
    lookup::{CATEGORY_CHOICES, GENDER_CHOICES, STATE_CHOICES},
    models::{FraudClassifier, OnnxClassifier},
    predictor::Predictor,
    types::{PredictionOutcome, RawInput},
    FeatureExtractor, LookupTables,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

/// Submission generator for testing
struct SubmissionGenerator {
    rng: rand::rngs::ThreadRng,
}

impl SubmissionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Daytime, modest amount, everyday category
    fn generate_legitimate(&mut self) -> RawInput {
        RawInput {
            amount: (self.rng.gen_range(5.0..250.0_f64) * 100.0).round() / 100.0,
            hour: self.rng.gen_range(8..21),
            day: self.rng.gen_range(1..=28),
            month: self.rng.gen_range(1..=12),
            age: self.rng.gen_range(25..70),
            gender: self.random_choice(&GENDER_CHOICES).to_string(),
            category: self
                .random_choice(&["Food & Dining", "Grocery (POS)", "Gas & Transport", "Home"])
                .to_string(),
            state: self.random_state().to_string(),
        }
    }

    /// Late night, large amount, card-not-present category
    fn generate_suspicious(&mut self) -> RawInput {
        RawInput {
            amount: (self.rng.gen_range(600.0..2500.0_f64) * 100.0).round() / 100.0,
            hour: [22, 23, 0, 1, 2, 3][self.rng.gen_range(0..6)],
            day: self.rng.gen_range(1..=28),
            month: self.rng.gen_range(1..=12),
            age: self.rng.gen_range(18..90),
            gender: self.random_choice(&GENDER_CHOICES).to_string(),
            category: self
                .random_choice(&["Shopping (Net)", "Miscellaneous (Net)", "Grocery (POS)"])
                .to_string(),
            state: self.random_state().to_string(),
        }
    }

    fn random_state(&mut self) -> &'static str {
        STATE_CHOICES[self.rng.gen_range(0..STATE_CHOICES.len())].0
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_scorer=info".parse()?)
                .add_directive("card_fraud_form=info".parse()?),
        )
        .init();

    info!("Starting Sample Submission Scorer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(20);
    let fraud_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.2)
        .clamp(0.0, 1.0);

    let config = AppConfig::load()?;
    info!(
        count = count,
        fraud_rate = fraud_rate,
        model = %config.model.path,
        categories = CATEGORY_CHOICES.len(),
        "Configuration loaded"
    );

    let classifier: Arc<dyn FraudClassifier> = match OnnxClassifier::new(&config.model) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            warn!(error = %e, "Failed to load model. Running in dry-run mode.");
            return run_dry_mode(&config, count, fraud_rate);
        }
    };

    let predictor = Predictor::from_config(&config, classifier);
    let mut generator = SubmissionGenerator::new();
    let mut rng = rand::thread_rng();

    let mut flagged = 0;
    let mut failed = 0;

    for i in 0..count {
        let suspicious = rng.gen_bool(fraud_rate);
        let input = if suspicious {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        match predictor.score(&input) {
            PredictionOutcome::Predicted(result) => {
                if result.is_fraud() {
                    flagged += 1;
                }
                info!(
                    n = i + 1,
                    generated_as = if suspicious { "suspicious" } else { "legitimate" },
                    amount = input.amount,
                    hour = input.hour,
                    category = %input.category,
                    label = %result.label,
                    percent = result.percent,
                    "Scored"
                );
            }
            PredictionOutcome::Failed { message } => {
                failed += 1;
                warn!(n = i + 1, "{}", message);
            }
        }
    }

    info!(
        "Completed! Scored {} submissions ({} flagged as fraud, {} failed)",
        count, flagged, failed
    );

    Ok(())
}

fn run_dry_mode(config: &AppConfig, count: u64, fraud_rate: f64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no model loaded)");

    let extractor = FeatureExtractor::new(config.features.clone(), LookupTables::new());
    let mut generator = SubmissionGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let input = if rng.gen_bool(fraud_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let record = extractor.extract(&input)?;
        let json = serde_json::to_string_pretty(&record)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample feature record {}:\n{}", i + 1, json);
        }
    }

    Ok(())
}
