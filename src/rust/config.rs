//! Command-line and environment configuration for the server binary.

use std::path::PathBuf;

use clap::Parser;

use crate::artifacts::{ArtifactLoader, DEFAULT_CLASSIFIER_FILE, DEFAULT_VECTORIZER_FILE};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Serves sentiment predictions over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "SENTIMENT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SENTIMENT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path to the fitted vectorizer artifact
    #[arg(long, env = "SENTIMENT_VECTORIZER", default_value = DEFAULT_VECTORIZER_FILE)]
    pub vectorizer: PathBuf,

    /// Path to the fitted classifier artifact (`.json`, or `.onnx` with the onnx feature)
    #[arg(long, env = "SENTIMENT_MODEL", default_value = DEFAULT_CLASSIFIER_FILE)]
    pub model: PathBuf,

    /// Expected SHA-256 of the vectorizer file
    #[arg(long, env = "SENTIMENT_VECTORIZER_SHA256")]
    pub vectorizer_sha256: Option<String>,

    /// Expected SHA-256 of the classifier file
    #[arg(long, env = "SENTIMENT_MODEL_SHA256")]
    pub model_sha256: Option<String>,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the loader for the configured artifact locations and digests
    pub fn artifact_loader(&self) -> ArtifactLoader {
        let mut loader = ArtifactLoader::new(&self.vectorizer, &self.model);
        if let Some(hash) = &self.vectorizer_sha256 {
            loader = loader.with_vectorizer_sha256(hash);
        }
        if let Some(hash) = &self.model_sha256 {
            loader = loader.with_classifier_sha256(hash);
        }
        loader
    }
}
