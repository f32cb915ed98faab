//! ONNX Runtime classifier for fraud scoring

use crate::config::ModelConfig;
use crate::feature_extractor::{FeatureRecord, FeatureValue};
use crate::models::classifier::FraudClassifier;
use crate::models::loader::{select_input_kind, InputKind, LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::SessionInputValue;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::borrow::Cow;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};

/// Classifier backed by an ONNX export of the trained pipeline.
///
/// Each feature column is fed as its own `[1, 1]` input, using the element
/// type the graph declares for it (int64/double for a frame-typed export,
/// float for an all-float one, string for categorical codes).
pub struct OnnxClassifier {
    /// Loaded model (sessions need exclusive access to run)
    model: Mutex<LoadedModel>,
    name: String,
}

impl OnnxClassifier {
    /// Load the classifier described by configuration
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load_model(&config.path, &config.name)?;

        info!(model = %config.name, "ONNX classifier ready");

        Ok(Self::from_loaded(model))
    }

    pub fn from_loaded(model: LoadedModel) -> Self {
        let name = model.name.clone();
        Self {
            model: Mutex::new(model),
            name,
        }
    }

    /// Build the named session inputs for one record, typed the way the
    /// graph declares each input.
    fn session_inputs(
        model: &LoadedModel,
        record: &FeatureRecord,
    ) -> Result<Vec<(Cow<'static, str>, SessionInputValue<'static>)>> {
        record
            .columns()
            .into_iter()
            .map(|(name, value)| {
                let kind = select_input_kind(value.kind(), model.declared_kind(name))
                    .context(format!("Input '{}' has an unsupported type", name))?;
                let tensor = input_tensor(value, kind)
                    .context(format!("Failed to create input tensor for {}", name))?;
                Ok((Cow::Borrowed(name), tensor))
            })
            .collect()
    }

    /// Extract fraud probability from model output.
    /// Handles both tensor outputs and seq(map) outputs (ZipMap exports).
    fn extract_probability(
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
        model_name: &str,
    ) -> Result<f64> {
        if let Some(output) = outputs.get(output_name) {
            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = Self::extract_fraud_prob_from_tensor(&shape, data)?;
                debug!(model = %model_name, prob = prob, "Extracted from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::extract_from_sequence_map(output, model_name) {
                    return Ok(prob);
                }
            }
        }

        // Fall back to any output that is not the predicted label
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            let dtype = output.dtype();

            if let Ok(tensor) = output.try_extract_tensor::<f32>() {
                let (shape, data) = tensor;
                let prob = Self::extract_fraud_prob_from_tensor(&shape, data)?;
                debug!(model = %model_name, output = %name, prob = prob, "Extracted from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&dtype) {
                if let Ok(prob) = Self::extract_from_sequence_map(&output, model_name) {
                    return Ok(prob);
                }
            }
        }

        anyhow::bail!("Model {} produced no probability output", model_name)
    }

    /// Extract probability from seq(map(int64, float)) format
    fn extract_from_sequence_map(output: &ort::value::DynValue, model_name: &str) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

        // Batch size is always 1
        let map_value = maps
            .first()
            .ok_or_else(|| anyhow::anyhow!("Empty sequence"))?;

        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

        if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
            debug!(model = %model_name, prob = *prob, "Extracted from seq(map)");
            return Ok(*prob as f64);
        }

        if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
            return Ok(1.0 - *prob as f64);
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }

    /// Extract fraud probability from tensor data
    fn extract_fraud_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> Result<f64> {
        let dims: Vec<i64> = shape.iter().copied().collect();
        fraud_prob_from_dims(&dims, data)
    }
}

/// A `[1, 1]` tensor holding one column value as the selected element type.
fn input_tensor(value: FeatureValue<'_>, kind: InputKind) -> Result<SessionInputValue<'static>> {
    let shape = vec![1_i64, 1];
    let tensor: SessionInputValue<'static> = match (value, kind) {
        (FeatureValue::Integer(v), InputKind::Int64) => Tensor::from_array((shape, vec![v]))?.into(),
        (FeatureValue::Integer(v), InputKind::Int32) => {
            let v = i32::try_from(v).context("Value does not fit in int32")?;
            Tensor::from_array((shape, vec![v]))?.into()
        }
        (FeatureValue::Integer(v), InputKind::Float64) => {
            Tensor::from_array((shape, vec![v as f64]))?.into()
        }
        (FeatureValue::Integer(v), InputKind::Float32) => {
            Tensor::from_array((shape, vec![v as f32]))?.into()
        }
        (FeatureValue::Real(v), InputKind::Float64) => Tensor::from_array((shape, vec![v]))?.into(),
        (FeatureValue::Real(v), InputKind::Float32) => {
            Tensor::from_array((shape, vec![v as f32]))?.into()
        }
        (FeatureValue::Text(code), InputKind::Text) => {
            Tensor::from_string_array((shape, &[code.to_string()][..]))?.into()
        }
        (value, kind) => anyhow::bail!("{:?} cannot be stored as {:?}", value, kind),
    };
    Ok(tensor)
}

/// Positive-class probability from a `[batch, classes]` or `[classes]` tensor.
fn fraud_prob_from_dims(dims: &[i64], data: &[f32]) -> Result<f64> {
    let num_classes = match dims {
        [_, classes] | [classes] => *classes,
        _ => anyhow::bail!("Unexpected probability tensor shape {:?}", dims),
    };

    let index = match num_classes {
        1 => 0,
        n if n >= 2 => 1,
        _ => anyhow::bail!("Probability tensor has no classes"),
    };

    data.get(index)
        .map(|&v| v as f64)
        .ok_or_else(|| anyhow::anyhow!("Probability tensor shorter than its shape {:?}", dims))
}

impl FraudClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_probability(&self, record: &FeatureRecord) -> Result<f64> {
        let start = Instant::now();

        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let inputs = Self::session_inputs(&model, record)?;
        let output_name = model.output_name.clone();

        let outputs = model
            .session
            .run(inputs)
            .context("Model inference failed")?;

        let prob = Self::extract_probability(&outputs, &output_name, &self.name)?;

        debug!(
            model = %self.name,
            prob = prob,
            inference_us = start.elapsed().as_micros() as u64,
            "Inference complete"
        );

        Ok(prob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_class_tensor_picks_positive_class() {
        let prob = fraud_prob_from_dims(&[1, 2], &[0.3, 0.7]).unwrap();
        assert!((prob - 0.7).abs() < 1e-6);

        let prob = fraud_prob_from_dims(&[2], &[0.9, 0.1]).unwrap();
        assert!((prob - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_single_column_tensor() {
        let prob = fraud_prob_from_dims(&[1, 1], &[0.25]).unwrap();
        assert!((prob - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_input_tensor_rejects_mismatched_value() {
        assert!(input_tensor(FeatureValue::Text("CA"), InputKind::Int64).is_err());
        assert!(input_tensor(FeatureValue::Real(1.5), InputKind::Int32).is_err());
        assert!(input_tensor(FeatureValue::Integer(i64::MAX), InputKind::Int32).is_err());
    }

    #[test]
    fn test_malformed_tensors_are_errors() {
        assert!(fraud_prob_from_dims(&[1, 2, 3], &[0.1; 6]).is_err());
        assert!(fraud_prob_from_dims(&[1, 2], &[0.1]).is_err());
        assert!(fraud_prob_from_dims(&[1, 0], &[]).is_err());
    }
}
