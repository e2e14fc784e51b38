//! Serves a pre-trained three-class sentiment model over HTTP.
//!
//! Two artifacts are loaded once at startup, a fitted TF-IDF vectorizer and
//! a fitted linear classifier, and shared read-only by every request.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sentiment_api::ArtifactLoader;
//!
//! let model = ArtifactLoader::new("tfidf_vectorizer.json", "sentiment_model.json").load()?;
//!
//! let prediction = model.predict("What a great announcement!")?;
//! println!("{} ({})", prediction.sentiment, prediction.prediction_code);
//! # Ok(())
//! # }
//! ```
//!
//! # Serving
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use sentiment_api::{build_router, AppState, ArtifactLoader};
//!
//! let model = ArtifactLoader::default().load()?;
//! let app = build_router(Arc::new(AppState::new(model)));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod config;
pub mod model;
#[cfg(feature = "onnx")]
mod runtime;
pub mod server;

pub use artifacts::{
    sha256_hex, ArtifactError, ArtifactKind, ArtifactLoader, ArtifactSource, DEFAULT_CLASSIFIER_FILE,
    DEFAULT_VECTORIZER_FILE,
};
pub use config::ServerConfig;
pub use model::{
    Classifier, LinearClassifier, LinearParams, ModelError, ModelInfo, Norm, Prediction, Sentiment,
    SentimentModel, SentimentModelBuilder, TfidfParams, TfidfVectorizer, Vectorizer,
};
#[cfg(feature = "onnx")]
pub use model::OnnxClassifier;
#[cfg(feature = "onnx")]
pub use runtime::{create_session_builder, RuntimeConfig};
pub use server::{build_router, health_handler, predict_handler, shutdown_signal, AppState, ErrorResponse, PredictRequest};

/// Initializes `env_logger`, reading `RUST_LOG` and defaulting to `info`.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}
