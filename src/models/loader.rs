//! ONNX model loader

use crate::feature_extractor::{ColumnKind, FEATURE_KINDS, FEATURE_NAMES};
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::ValueType;
use std::path::Path;
use tracing::{info, warn};

/// Tensor element types a feature column can be fed as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Float32,
    Float64,
    Int32,
    Int64,
    Text,
}

impl InputKind {
    /// Map a declared element type; `None` for types no column can supply.
    pub fn from_element_type(ty: TensorElementType) -> Option<Self> {
        match ty {
            TensorElementType::Float32 => Some(InputKind::Float32),
            TensorElementType::Float64 => Some(InputKind::Float64),
            TensorElementType::Int32 => Some(InputKind::Int32),
            TensorElementType::Int64 => Some(InputKind::Int64),
            TensorElementType::String => Some(InputKind::Text),
            _ => None,
        }
    }
}

/// One declared graph input
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub name: String,
    /// `None` when the input is not a tensor of a supported element type
    pub kind: Option<InputKind>,
}

/// Pick the tensor type for a column given what the graph declares.
///
/// Undeclared columns fall back to the training frame's own type (int64,
/// double, string). Integers may widen into float inputs; reals are never
/// truncated into integer inputs, and text only goes to string inputs.
pub fn select_input_kind(column: ColumnKind, declared: Option<InputKind>) -> Result<InputKind> {
    use InputKind::*;

    let kind = match (column, declared) {
        (ColumnKind::Integer, None) => Int64,
        (ColumnKind::Real, None) => Float64,
        (ColumnKind::Text, None) => Text,
        (ColumnKind::Integer, Some(k @ (Float32 | Float64 | Int32 | Int64))) => k,
        (ColumnKind::Real, Some(k @ (Float32 | Float64))) => k,
        (ColumnKind::Text, Some(Text)) => Text,
        (column, Some(declared)) => {
            anyhow::bail!("{:?} column cannot be fed to a {:?} input", column, declared)
        }
    };
    Ok(kind)
}

/// Loaded ONNX pipeline with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Declared inputs, in graph order
    pub inputs: Vec<ModelInput>,
    /// Output name for probabilities
    pub output_name: String,
}

impl LoadedModel {
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|i| i.name.as_str()).collect()
    }

    /// Declared kind of a named input, if the graph has it and it is supported.
    pub fn declared_kind(&self, name: &str) -> Option<InputKind> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .and_then(|i| i.kind)
    }

    /// Feature columns the model does not declare as inputs.
    pub fn missing_inputs(&self) -> Vec<&'static str> {
        missing_inputs(&self.inputs)
    }

    /// Feature columns whose declared input type the record cannot supply.
    pub fn incompatible_inputs(&self) -> Vec<String> {
        incompatible_inputs(&self.inputs)
    }
}

/// Feature columns absent from a model's declared inputs.
fn missing_inputs(inputs: &[ModelInput]) -> Vec<&'static str> {
    FEATURE_NAMES
        .iter()
        .copied()
        .filter(|feature| !inputs.iter().any(|input| input.name == *feature))
        .collect()
}

fn incompatible_inputs(inputs: &[ModelInput]) -> Vec<String> {
    FEATURE_NAMES
        .iter()
        .zip(FEATURE_KINDS)
        .filter_map(|(feature, column)| {
            let input = inputs.iter().find(|input| input.name == *feature)?;
            match input.kind {
                None => Some(format!("{feature}: unsupported input type")),
                Some(declared) => select_input_kind(column, Some(declared))
                    .err()
                    .map(|e| format!("{feature}: {e}")),
            }
        })
        .collect()
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the exported pipeline from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let inputs: Vec<ModelInput> = session
            .inputs
            .iter()
            .map(|i| ModelInput {
                name: i.name.clone(),
                kind: match &i.input_type {
                    ValueType::Tensor { ty, .. } => InputKind::from_element_type(*ty),
                    _ => None,
                },
            })
            .collect();

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        let model = LoadedModel {
            name: name.to_string(),
            session,
            inputs,
            output_name,
        };

        let missing = model.missing_inputs();
        if !missing.is_empty() {
            warn!(
                model = %name,
                missing = ?missing,
                declared = ?model.input_names(),
                "Model inputs do not match the feature schema; predictions will fail"
            );
        }

        let incompatible = model.incompatible_inputs();
        if !incompatible.is_empty() {
            warn!(
                model = %name,
                incompatible = ?incompatible,
                "Model input types cannot be supplied by the feature record; predictions will fail"
            );
        }

        info!(
            model = %name,
            inputs = model.inputs.len(),
            output = %model.output_name,
            "Model loaded successfully"
        );

        Ok(model)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}
