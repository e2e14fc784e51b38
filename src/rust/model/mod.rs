mod error;
mod traits;
mod utils;
mod labels;
mod tfidf;
mod linear;
#[cfg(feature = "onnx")]
mod onnx;
mod sentiment;
pub mod builder;

pub use error::ModelError;
pub use traits::{Classifier, Vectorizer};
pub use labels::Sentiment;
pub use tfidf::{Norm, TfidfParams, TfidfVectorizer, DEFAULT_TOKEN_PATTERN};
pub use linear::{LinearClassifier, LinearParams};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use sentiment::{Prediction, SentimentModel};
pub use builder::SentimentModelBuilder;

/// Information about the artifacts behind a loaded model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Where the vectorizer was loaded from, if recorded
    pub vectorizer_source: Option<String>,
    /// Where the classifier was loaded from, if recorded
    pub classifier_source: Option<String>,
    /// Width of the feature vectors passed between the two
    pub n_features: usize,
}
