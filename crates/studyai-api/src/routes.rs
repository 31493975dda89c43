//! API route definitions

use crate::handlers::{gateway, health, quiz, root, summarize};
use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Service and documentation routes
pub fn service_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root::read_root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/openapi.json", get(openapi_json))
}

/// Summarization, quiz and gateway routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summarize-web", post(summarize::summarize_web))
        .route("/summarize-pdf", post(summarize::summarize_pdf))
        .route("/summarize-combined", post(summarize::summarize_combined))
        .route("/generate-quiz", post(quiz::generate_quiz))
        .route("/api/process-topic", post(gateway::process_topic))
}
