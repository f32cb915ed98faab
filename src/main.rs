//! Fraud Scoring Form - Main Entry Point
//!
//! Loads the trained pipeline once, then serves the form and scores each
//! submission against it.

use anyhow::{Context, Result};
use card_fraud_form::{
    config::{AppConfig, LoggingConfig},
    models::{FraudClassifier, OnnxClassifier},
    predictor::Predictor,
    web::{router, AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    init_tracing(&config.logging)?;

    info!("Starting Fraud Scoring Form");
    info!(
        threshold = config.detection.threshold,
        high_amount_cutoff = config.features.high_amount_cutoff,
        amount_mean_divisor = config.features.amount_mean_divisor,
        city_pop = config.features.placeholder_city_pop,
        "Configuration loaded"
    );

    // Load the classifier once; shared read-only by every request
    let classifier: Arc<dyn FraudClassifier> = Arc::new(
        OnnxClassifier::new(&config.model)
            .with_context(|| format!("Failed to load classifier from {}", config.model.path))?,
    );

    let predictor = Arc::new(Predictor::from_config(&config, classifier));
    info!(
        model = %predictor.classifier_name(),
        features = predictor.extractor().feature_count(),
        "Predictor initialized"
    );

    let app = router(AppState { predictor });
    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Form available at http://{bind_addr}/");

    axum::serve(listener, app).await?;

    info!("Server shutting down...");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("card_fraud_form={}", logging.level).parse()?)
        .add_directive("tower_http=info".parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
