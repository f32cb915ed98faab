//! Configuration management for the fraud scoring form

use crate::feature_extractor::FeatureSettings;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file read when `FRAUD_FORM_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub detection: DetectionConfig,
    pub features: FeatureSettings,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX export of the trained pipeline
    pub path: String,
    /// Name used in logs and the health endpoint
    pub name: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Decision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Probability at or above which a transaction is labelled fraud
    pub threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from `FRAUD_FORM_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("FRAUD_FORM_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration layered as defaults, then file, then environment.
    ///
    /// The file is optional. Environment keys use the `FRAUD_FORM__` prefix
    /// with `__` between sections, e.g. `FRAUD_FORM__SERVER__PORT=9000`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("FRAUD_FORM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scoring path cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.threshold) {
            bail!(
                "detection.threshold must be within [0, 1], got {}",
                self.detection.threshold
            );
        }
        let divisor = self.features.amount_mean_divisor;
        if !(divisor.is_finite() && divisor > 0.0) {
            bail!(
                "features.amount_mean_divisor must be a positive number, got {}",
                divisor
            );
        }
        if !self.features.high_amount_cutoff.is_finite() {
            bail!(
                "features.high_amount_cutoff must be a finite number, got {}",
                self.features.high_amount_cutoff
            );
        }
        if let Some(hour) = self.features.night_hours.iter().find(|&&h| h > 23) {
            bail!("features.night_hours contains invalid hour {}", hour);
        }
        if self.model.onnx_threads == 0 {
            bail!("model.onnx_threads must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            model: ModelConfig {
                path: "models/xgb_fraud_pipeline.onnx".to_string(),
                name: "xgb_fraud_pipeline".to_string(),
                onnx_threads: 1,
            },
            detection: DetectionConfig { threshold: 0.5 },
            features: FeatureSettings::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
