//! Quiz generation handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use studyai_core::Quiz;
use utoipa::ToSchema;

/// Quiz request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuizRequest {
    /// Summary the quiz is generated from
    pub summary: String,
}

/// Generate a multiple-choice quiz from a summary
#[utoipa::path(
    post,
    path = "/generate-quiz",
    tag = "quiz",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "Quiz generated", body = Quiz),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 500, description = "LLM failure or malformed quiz", body = crate::error::ApiError)
    )
)]
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<Quiz>, AppError> {
    state.increment_requests();
    let Json(request) = payload?;

    let quiz = state.pipeline.generate_quiz(&request.summary).await?;
    Ok(Json(quiz))
}
