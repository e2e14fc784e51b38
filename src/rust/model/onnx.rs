use std::collections::HashMap;

use log::info;
use ndarray::ArrayView2;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ModelError;
use super::traits::Classifier;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A classifier exported to ONNX.
///
/// The graph must take a single `float` input of shape `[N, n_features]`
/// and emit `int64` labels of shape `[N]` as its first output, which is
/// the layout produced when linear scikit-style models are converted.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    n_features: Option<usize>,
}

impl OnnxClassifier {
    /// Loads a classifier from the bytes of an `.onnx` file.
    pub fn from_memory(bytes: &[u8], config: &RuntimeConfig) -> Result<Self, ModelError> {
        let session = create_session_builder(config)?.commit_from_memory(bytes)?;
        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, ModelError> {
        if session.inputs.len() != 1 {
            return Err(ModelError::InvalidArtifact(format!(
                "ONNX classifier must have exactly 1 input (features), found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "ONNX classifier must have at least 1 output for labels".to_string(),
            ));
        }

        let input = &session.inputs[0];
        // A symbolic or missing width is reported as -1
        let n_features = input
            .input_type
            .tensor_dimensions()
            .and_then(|dims| dims.get(1).copied())
            .and_then(|width| usize::try_from(width).ok());
        info!("ONNX classifier input '{}' with width {:?}", input.name, n_features);

        Ok(Self {
            input_name: input.name.clone(),
            session,
            n_features,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Vec<i64>, ModelError> {
        let input_dyn = features.to_owned().into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input).map_err(|e| {
                ModelError::PredictionError(format!("Failed to create input tensor: {}", e))
            })?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| ModelError::PredictionError(format!("Failed to run model: {}", e)))?;
        let labels = outputs[0].try_extract_tensor::<i64>().map_err(|e| {
            ModelError::PredictionError(format!("Failed to extract label tensor: {}", e))
        })?;

        Ok(labels.iter().copied().collect())
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // MatMul + Add + ArgMax graph over 3 features, labels -1, 0 and 1
    const LINEAR_GRAPH: &[u8] = include_bytes!("../../../tests/fixtures/linear_classifier.onnx");

    #[test]
    fn test_width_read_from_graph_input() {
        let classifier = OnnxClassifier::from_memory(LINEAR_GRAPH, &RuntimeConfig::default()).unwrap();
        assert_eq!(classifier.n_features(), Some(3));
    }

    #[test]
    fn test_predict_labels() {
        let classifier = OnnxClassifier::from_memory(LINEAR_GRAPH, &RuntimeConfig::default()).unwrap();
        let x = array![
            [1.0f32, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0]
        ];
        assert_eq!(classifier.predict(x.view()).unwrap(), vec![1, -1, 0, 0]);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = OnnxClassifier::from_memory(b"not an onnx graph", &RuntimeConfig::default());
        assert!(result.is_err());
    }
}
