use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::labels::Sentiment;
use super::traits::{Classifier, Vectorizer};
use super::ModelInfo;

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// The text exactly as it was submitted
    pub input_text: String,
    /// Raw class code emitted by the classifier
    pub prediction_code: i64,
    pub sentiment: Sentiment,
}

/// A loaded vectorizer/classifier pair.
///
/// # Thread Safety
///
/// Both components are `Send + Sync` trait objects held behind `Arc` and
/// only ever read after construction, so a `SentimentModel` can be shared
/// across request handlers with `Arc<SentimentModel>` without locking.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use sentiment_api::{SentimentModel, LinearClassifier, LinearParams, TfidfParams, TfidfVectorizer};
///
/// let vectorizer = TfidfVectorizer::from_params(serde_json::from_str(
///     r#"{"vocabulary": {"good": 0, "bad": 1}}"#,
/// )?)?;
/// let classifier = LinearClassifier::from_params(LinearParams {
///     classes: vec![-1.0, 1.0],
///     coef: vec![vec![1.0, -1.0]],
///     intercept: vec![0.0],
/// })?;
///
/// let model = SentimentModel::builder()
///     .with_vectorizer(vectorizer)
///     .with_classifier(classifier)
///     .build()?;
///
/// let prediction = model.predict("a good day")?;
/// assert_eq!(prediction.prediction_code, 1);
/// # Ok(())
/// # }
/// ```
pub struct SentimentModel {
    pub(crate) vectorizer: Arc<dyn Vectorizer>,
    pub(crate) classifier: Arc<dyn Classifier>,
    pub(crate) vectorizer_source: Option<String>,
    pub(crate) classifier_source: Option<String>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SentimentModel>();
    }
};

impl fmt::Debug for SentimentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentModel")
            .field("vectorizer_source", &self.vectorizer_source)
            .field("classifier_source", &self.classifier_source)
            .field("n_features", &self.vectorizer.n_features())
            .finish()
    }
}

impl SentimentModel {
    /// Creates a new SentimentModelBuilder for fluent construction
    pub fn builder() -> super::builder::SentimentModelBuilder {
        super::builder::SentimentModelBuilder::new()
    }

    /// Returns information about the loaded artifacts
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            vectorizer_source: self.vectorizer_source.clone(),
            classifier_source: self.classifier_source.clone(),
            n_features: self.vectorizer.n_features(),
        }
    }

    /// Classifies a single text.
    ///
    /// The text is wrapped into a one-element batch, vectorized, classified,
    /// and the first code is mapped through the label table. Codes outside
    /// the table yield [`Sentiment::Unknown`] rather than an error.
    ///
    /// # Errors
    /// Forwards errors from the vectorizer and classifier, and returns
    /// `PredictionError` if the classifier produces no code.
    pub fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        let features = self.vectorizer.transform(&[text])?;
        let codes = self.classifier.predict(features.view())?;
        let prediction_code = codes
            .first()
            .copied()
            .ok_or_else(|| ModelError::PredictionError("Classifier returned no prediction".into()))?;

        let sentiment = Sentiment::from_code(prediction_code);
        if sentiment == Sentiment::Unknown {
            warn!("Prediction code {} has no sentiment label, reporting Unknown", prediction_code);
        }
        debug!("Predicted {} ({}) for {} chars of input", sentiment, prediction_code, text.len());

        Ok(Prediction {
            input_text: text.to_string(),
            prediction_code,
            sentiment,
        })
    }
}
