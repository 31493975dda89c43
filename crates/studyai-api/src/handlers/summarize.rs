//! Summarization handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studyai_parser::is_pdf_content_type;
use utoipa::ToSchema;

/// Topic request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TopicRequest {
    #[schema(example = "quantum computing")]
    pub topic: String,
}

/// Summary response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Multipart body of `/summarize-pdf`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct PdfUploadForm {
    /// PDF document
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Multipart body of `/summarize-combined`
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct CombinedUploadForm {
    topic: String,
    /// PDF document
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Summarize a topic from web search results
#[utoipa::path(
    post,
    path = "/summarize-web",
    tag = "summarize",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 500, description = "Search or LLM failure", body = crate::error::ApiError)
    )
)]
pub async fn summarize_web(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TopicRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    state.increment_requests();
    let Json(request) = payload?;

    let summary = state.pipeline.summarize_web(&request.topic).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Summarize an uploaded PDF
#[utoipa::path(
    post,
    path = "/summarize-pdf",
    tag = "summarize",
    request_body(content = PdfUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 400, description = "Not a PDF or malformed form", body = crate::error::ApiError),
        (status = 500, description = "Parse or LLM failure", body = crate::error::ApiError)
    )
)]
pub async fn summarize_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    state.increment_requests();
    let form = read_upload(multipart?).await?;
    let file = form.file.ok_or_else(|| missing_field("file"))?;

    tracing::debug!(bytes = file.len(), "PDF upload received");
    let summary = state.pipeline.summarize_pdf(file).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Summarize a topic and an uploaded PDF together
#[utoipa::path(
    post,
    path = "/summarize-combined",
    tag = "summarize",
    request_body(content = CombinedUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 400, description = "Not a PDF or malformed form", body = crate::error::ApiError),
        (status = 500, description = "Search, parse or LLM failure", body = crate::error::ApiError)
    )
)]
pub async fn summarize_combined(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    state.increment_requests();
    let form = read_upload(multipart?).await?;
    let topic = form.topic.ok_or_else(|| missing_field("topic"))?;
    let file = form.file.ok_or_else(|| missing_field("file"))?;

    let summary = state.pipeline.summarize_combined(&topic, file).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Fields collected from an upload form
#[derive(Default)]
struct UploadForm {
    topic: Option<String>,
    file: Option<Bytes>,
}

/// Read the upload form.
///
/// The file's declared content type is checked before its body is read, so a
/// non-PDF upload is rejected without buffering it.
async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default();
                if !is_pdf_content_type(content_type) {
                    tracing::warn!(content_type = %content_type, "Rejected non-PDF upload");
                    return Err(AppError::invalid_file_type());
                }
                form.file = Some(field.bytes().await?);
            }
            Some("topic") => form.topic = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

fn missing_field(name: &str) -> AppError {
    AppError::BadRequest(format!("Missing form field: {name}"))
}
