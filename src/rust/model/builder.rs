use std::sync::Arc;

use log::info;

use super::error::ModelError;
use super::sentiment::SentimentModel;
use super::traits::{Classifier, Vectorizer};

/// A builder for assembling a [`SentimentModel`] with a fluent interface.
#[derive(Default)]
pub struct SentimentModelBuilder {
    vectorizer: Option<Arc<dyn Vectorizer>>,
    classifier: Option<Arc<dyn Classifier>>,
    vectorizer_source: Option<String>,
    classifier_source: Option<String>,
}

impl SentimentModelBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vectorizer that turns request text into features
    pub fn with_vectorizer(mut self, vectorizer: impl Vectorizer + 'static) -> Self {
        self.vectorizer = Some(Arc::new(vectorizer));
        self
    }

    /// Sets the classifier applied to the vectorizer's output
    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Records where the vectorizer came from, reported by [`SentimentModel::info`]
    pub fn vectorizer_source(mut self, source: impl Into<String>) -> Self {
        self.vectorizer_source = Some(source.into());
        self
    }

    /// Records where the classifier came from, reported by [`SentimentModel::info`]
    pub fn classifier_source(mut self, source: impl Into<String>) -> Self {
        self.classifier_source = Some(source.into());
        self
    }

    /// Builds the model.
    ///
    /// # Errors
    /// `BuildError` if either component is missing, or if the classifier
    /// declares an input width different from the vectorizer's output width.
    pub fn build(self) -> Result<SentimentModel, ModelError> {
        let vectorizer = self
            .vectorizer
            .ok_or_else(|| ModelError::BuildError("A vectorizer must be set".into()))?;
        let classifier = self
            .classifier
            .ok_or_else(|| ModelError::BuildError("A classifier must be set".into()))?;

        if let Some(expected) = classifier.n_features() {
            if expected != vectorizer.n_features() {
                return Err(ModelError::BuildError(format!(
                    "Vectorizer produces {} features but classifier expects {}",
                    vectorizer.n_features(),
                    expected
                )));
            }
        }
        info!("Sentiment model assembled with {} features", vectorizer.n_features());

        Ok(SentimentModel {
            vectorizer,
            classifier,
            vectorizer_source: self.vectorizer_source,
            classifier_source: self.classifier_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearClassifier, LinearParams, TfidfVectorizer};

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::from_params(
            serde_json::from_value(serde_json::json!({
                "vocabulary": { "good": 0, "bad": 1 }
            }))
            .unwrap(),
        )
        .unwrap()
    }

    fn classifier(width: usize) -> LinearClassifier {
        LinearClassifier::from_params(LinearParams {
            classes: vec![-1.0, 1.0],
            coef: vec![vec![1.0; width]],
            intercept: vec![0.0],
        })
        .unwrap()
    }

    #[test]
    fn test_missing_parts() {
        assert!(matches!(
            SentimentModelBuilder::new().with_classifier(classifier(2)).build(),
            Err(ModelError::BuildError(_))
        ));
        assert!(matches!(
            SentimentModelBuilder::new().with_vectorizer(vectorizer()).build(),
            Err(ModelError::BuildError(_))
        ));
    }

    #[test]
    fn test_width_mismatch() {
        let result = SentimentModelBuilder::new()
            .with_vectorizer(vectorizer())
            .with_classifier(classifier(3))
            .build();
        assert!(matches!(result, Err(ModelError::BuildError(_))));
    }

    #[test]
    fn test_sources_recorded() {
        let model = SentimentModelBuilder::new()
            .with_vectorizer(vectorizer())
            .with_classifier(classifier(2))
            .vectorizer_source("vec.json")
            .classifier_source("clf.json")
            .build()
            .unwrap();
        let info = model.info();
        assert_eq!(info.vectorizer_source.as_deref(), Some("vec.json"));
        assert_eq!(info.classifier_source.as_deref(), Some("clf.json"));
        assert_eq!(info.n_features, 2);
    }
}
