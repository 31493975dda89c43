//! OpenAPI document

use crate::error::ApiError;
use crate::handlers::{gateway, health, quiz, root, summarize};
use axum::Json;
use studyai_core::{Question, Quiz, QuizOption};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AI Microservice",
        description = "Web and PDF summarization with quiz generation"
    ),
    paths(
        root::read_root,
        health::health_check,
        summarize::summarize_web,
        summarize::summarize_pdf,
        summarize::summarize_combined,
        quiz::generate_quiz,
        gateway::process_topic,
    ),
    components(schemas(
        ApiError,
        root::MessageResponse,
        health::HealthResponse,
        health::BuildInfo,
        summarize::TopicRequest,
        summarize::SummaryResponse,
        summarize::PdfUploadForm,
        summarize::CombinedUploadForm,
        quiz::QuizRequest,
        gateway::GatewayError,
        Quiz,
        Question,
        QuizOption,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "summarize", description = "Summaries from web search and PDF uploads"),
        (name = "quiz", description = "Multiple-choice quiz generation"),
        (name = "gateway", description = "Front-end gateway")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
