/// Errors raised while validating artifact contents or running inference.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The artifact deserialized but its contents are inconsistent
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
    /// Error occurred while assembling a model from its parts
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred while making predictions
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for ModelError {
    fn from(err: ort::Error) -> Self {
        ModelError::PredictionError(err.to_string())
    }
}
