use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::model::{
    LinearClassifier, LinearParams, ModelError, SentimentModel, SentimentModelBuilder, TfidfParams,
    TfidfVectorizer, Vectorizer,
};
#[cfg(feature = "onnx")]
use crate::model::OnnxClassifier;
#[cfg(feature = "onnx")]
use crate::runtime::RuntimeConfig;

/// Vectorizer file looked up in the working directory by default
pub const DEFAULT_VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
/// Classifier file looked up in the working directory by default
pub const DEFAULT_CLASSIFIER_FILE: &str = "sentiment_model.json";

/// Which of the two artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vectorizer => f.write_str("vectorizer"),
            Self::Classifier => f.write_str("classifier"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found: {}", .path.display())]
    NotFound { kind: ArtifactKind, path: PathBuf },
    #[error("IO error reading {kind} artifact {}: {source}", .path.display())]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {kind} artifact {}: {source}", .path.display())]
    Parse {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {kind} file")]
    HashMismatch {
        kind: ArtifactKind,
        expected: String,
        actual: String,
    },
    #[error("Unsupported {kind} artifact {}: {message}", .path.display())]
    UnsupportedFormat {
        kind: ArtifactKind,
        path: PathBuf,
        message: String,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Location of one artifact plus the digest it must match, if pinned.
#[derive(Debug, Clone)]
pub struct ArtifactSource {
    pub path: PathBuf,
    pub sha256: Option<String>,
}

impl ArtifactSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sha256: None,
        }
    }
}

/// Loads the vectorizer/classifier pair once at startup.
///
/// Loading is all-or-nothing: a missing, unreadable, corrupt or mismatched
/// artifact fails [`ArtifactLoader::load`] and nothing is returned, so a
/// server built on it cannot come up half-initialized.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    vectorizer: ArtifactSource,
    classifier: ArtifactSource,
    #[cfg(feature = "onnx")]
    runtime_config: RuntimeConfig,
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new(DEFAULT_VECTORIZER_FILE, DEFAULT_CLASSIFIER_FILE)
    }
}

impl ArtifactLoader {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(vectorizer_path: P, classifier_path: Q) -> Self {
        Self {
            vectorizer: ArtifactSource::new(vectorizer_path),
            classifier: ArtifactSource::new(classifier_path),
            #[cfg(feature = "onnx")]
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Uses the default file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_VECTORIZER_FILE), dir.join(DEFAULT_CLASSIFIER_FILE))
    }

    /// Pins the expected SHA-256 (hex) of the vectorizer file
    pub fn with_vectorizer_sha256(mut self, hash: impl Into<String>) -> Self {
        self.vectorizer.sha256 = Some(hash.into());
        self
    }

    /// Pins the expected SHA-256 (hex) of the classifier file
    pub fn with_classifier_sha256(mut self, hash: impl Into<String>) -> Self {
        self.classifier.sha256 = Some(hash.into());
        self
    }

    #[cfg(feature = "onnx")]
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    pub fn vectorizer_path(&self) -> &Path {
        &self.vectorizer.path
    }

    pub fn classifier_path(&self) -> &Path {
        &self.classifier.path
    }

    /// Reads, verifies and deserializes both artifacts into a ready model.
    ///
    /// # Errors
    /// Any [`ArtifactError`]; the first failing artifact aborts the load.
    pub fn load(&self) -> Result<SentimentModel, ArtifactError> {
        log::info!("Loading sentiment artifacts");
        let vectorizer = self.load_vectorizer()?;
        let builder = SentimentModel::builder()
            .with_vectorizer(vectorizer)
            .vectorizer_source(self.vectorizer.path.display().to_string());
        let builder = self.attach_classifier(builder)?;
        let model = builder.build()?;
        log::info!("Sentiment artifacts loaded successfully");
        Ok(model)
    }

    pub fn load_vectorizer(&self) -> Result<TfidfVectorizer, ArtifactError> {
        let kind = ArtifactKind::Vectorizer;
        let bytes = self.read_artifact(kind, &self.vectorizer)?;
        let params: TfidfParams = parse_json(kind, &self.vectorizer.path, &bytes)?;
        let vectorizer = TfidfVectorizer::from_params(params)?;
        log::info!("TF-IDF vectorizer ready with {} features", vectorizer.n_features());
        Ok(vectorizer)
    }

    pub fn load_classifier(&self) -> Result<LinearClassifier, ArtifactError> {
        let kind = ArtifactKind::Classifier;
        let bytes = self.read_artifact(kind, &self.classifier)?;
        let params: LinearParams = parse_json(kind, &self.classifier.path, &bytes)?;
        let classifier = LinearClassifier::from_params(params)?;
        log::info!("Linear classifier ready with classes {:?}", classifier.classes());
        Ok(classifier)
    }

    fn attach_classifier(
        &self,
        builder: SentimentModelBuilder,
    ) -> Result<SentimentModelBuilder, ArtifactError> {
        let source = self.classifier.path.display().to_string();
        if has_extension(&self.classifier.path, &["onnx"]) {
            #[cfg(feature = "onnx")]
            {
                let bytes = self.read_artifact(ArtifactKind::Classifier, &self.classifier)?;
                let classifier = OnnxClassifier::from_memory(&bytes, &self.runtime_config)?;
                log::info!("ONNX classifier ready");
                return Ok(builder.with_classifier(classifier).classifier_source(source));
            }
            #[cfg(not(feature = "onnx"))]
            return Err(ArtifactError::UnsupportedFormat {
                kind: ArtifactKind::Classifier,
                path: self.classifier.path.clone(),
                message: "ONNX models need the `onnx` feature".to_string(),
            });
        }
        let classifier = self.load_classifier()?;
        Ok(builder.with_classifier(classifier).classifier_source(source))
    }

    fn read_artifact(&self, kind: ArtifactKind, source: &ArtifactSource) -> Result<Vec<u8>, ArtifactError> {
        let path = &source.path;
        log::info!("Reading {} artifact from {:?}", kind, path);
        if !path.exists() {
            log::error!("{} artifact does not exist at {:?}", kind, path);
            return Err(ArtifactError::NotFound {
                kind,
                path: path.clone(),
            });
        }
        if has_extension(path, &["pkl", "pickle", "joblib"]) {
            return Err(ArtifactError::UnsupportedFormat {
                kind,
                path: path.clone(),
                message: "pickled Python objects cannot be loaded; export the fitted model to JSON"
                    .to_string(),
            });
        }

        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            kind,
            path: path.clone(),
            source,
        })?;
        log::info!("Read {} bytes", bytes.len());

        if let Some(expected) = &source.sha256 {
            let actual = sha256_hex(&bytes);
            log::info!("Calculated hash: {}", actual);
            log::info!("Expected hash:   {}", expected);
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                log::error!("{} hash mismatch: expected {}, got {}", kind, expected, actual);
                return Err(ArtifactError::HashMismatch {
                    kind,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(bytes)
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn parse_json<T: serde::de::DeserializeOwned>(
    kind: ArtifactKind,
    path: &Path,
    bytes: &[u8],
) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
