//! HTTP surface: health check and the prediction endpoint.
//!
//! The loaded [`SentimentModel`] is the only shared state. It is built
//! before the router exists and handed to every handler through
//! `Arc<AppState>`; handlers only read it.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::model::SentimentModel;

/// Shared state handed to every request handler.
#[derive(Debug)]
pub struct AppState {
    /// The read-only model loaded at startup.
    pub model: SentimentModel,
}

impl AppState {
    pub fn new(model: SentimentModel) -> Self {
        Self { model }
    }
}

/// Body of `POST /predict_sentiment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Build the axum [`Router`] with all routes and a CORS policy that admits
/// any origin, method and header.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/predict_sentiment", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe; does not touch the model.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Sentiment API is running",
    }))
}

/// Classifies the submitted text.
///
/// Bodies that are not JSON, or lack a string `text`, are rejected with the
/// extractor's 4xx status before the model is consulted.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Rejected prediction request: {}", rejection.body_text());
            return api_error(rejection.status(), &rejection.body_text());
        }
    };

    // Inference is CPU-bound; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || state.model.predict(&request.text)).await;

    match result {
        Ok(Ok(prediction)) => (StatusCode::OK, Json(prediction)).into_response(),
        Ok(Err(e)) => {
            error!("Prediction failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!("Prediction task did not complete: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Prediction task failed")
        }
    }
}

/// Build a JSON error response.
fn api_error(status: StatusCode, message: &str) -> Response {
    let body = ErrorResponse {
        detail: message.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Resolves when the process is asked to stop (SIGINT or SIGTERM, Ctrl-C
/// on non-Unix platforms).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Shutdown signal received (SIGINT)"),
        _ = terminate => info!("Shutdown signal received (SIGTERM)"),
    }
}
