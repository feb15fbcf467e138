//! Thin ONNX Runtime wrapper shared by the detector, head-pose and landmark models.

use crate::{Error, Result};
use ndarray::{Array4, CowArray};
use ort::{Environment, Session, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Flattened `f32` outputs of one inference call, keyed by output name
#[derive(Debug, Clone, Default)]
pub struct ModelOutputs {
    order: Vec<String>,
    values: HashMap<String, Vec<f32>>,
}

impl ModelOutputs {
    /// Build outputs from `(name, data)` pairs in model output order
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, Vec<f32>)>) -> Self {
        let mut outputs = Self::default();
        for (name, data) in pairs {
            outputs.order.push(name.clone());
            outputs.values.insert(name, data);
        }
        outputs
    }

    /// Output by name
    ///
    /// # Errors
    ///
    /// Returns an error if the model produced no output with this name
    pub fn named(&self, name: &str) -> Result<&[f32]> {
        self.values
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::ModelOutputError(format!("Missing output channel '{name}'")))
    }

    /// First output in model order
    ///
    /// # Errors
    ///
    /// Returns an error if the model produced no outputs
    pub fn first(&self) -> Result<&[f32]> {
        let name = self
            .order
            .first()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;
        self.named(name)
    }
}

/// A loaded ONNX model with a single image input
pub struct OnnxModel {
    session: Session,
    output_names: Vec<String>,
}

impl OnnxModel {
    /// Load a model from file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model file does not exist
    /// - The ONNX runtime environment cannot be created
    /// - The model cannot be loaded or has no inputs/outputs
    pub fn load<P: AsRef<Path>>(name: &str, model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }
        if !model_path.is_file() {
            return Err(Error::ModelError(format!("{} is not a model file", model_path.display())));
        }
        log::info!("Loading {} model: {}", name, model_path.display());

        let environment = Arc::new(
            Environment::builder()
                .with_name(name)
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.inputs.is_empty() {
            return Err(Error::ModelInputError(format!("Model {name} has no inputs")));
        }

        let output_names: Vec<String> = session.outputs.iter().map(|output| output.name.clone()).collect();
        if output_names.is_empty() {
            return Err(Error::ModelOutputError(format!("Model {name} has no outputs")));
        }

        Ok(Self { session, output_names })
    }

    /// Run the model on an NCHW tensor
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or an output is not an `f32` tensor
    pub fn run(&self, input: Array4<f32>) -> Result<ModelOutputs> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut pairs = Vec::with_capacity(outputs.len());
        for (name, output) in self.output_names.iter().zip(outputs.iter()) {
            let tensor = output.try_extract::<f32>()?;
            let data: Vec<f32> = tensor.view().iter().copied().collect();
            pairs.push((name.clone(), data));
        }

        Ok(ModelOutputs::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outputs_lookup() {
        let outputs = ModelOutputs::from_pairs(vec![
            ("detection_out".to_string(), vec![0.0, 1.0]),
            ("aux".to_string(), vec![2.0]),
        ]);
        assert_eq!(outputs.first().unwrap(), &[0.0, 1.0]);
        assert_eq!(outputs.named("aux").unwrap(), &[2.0]);
        assert!(matches!(outputs.named("angle_y_fc"), Err(Error::ModelOutputError(_))));
    }

    #[test]
    fn test_empty_outputs() {
        assert!(ModelOutputs::default().first().is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let result = OnnxModel::load("missing", "definitely/not/here.onnx");
        assert!(matches!(result, Err(Error::ModelNotFound(_))));
    }
}
