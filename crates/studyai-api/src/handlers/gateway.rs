//! Front-end gateway route

use super::summarize::{SummaryResponse, TopicRequest};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Body returned when the gateway cannot complete a request
pub const GATEWAY_FAILURE: &str = "Failed to process request.";

/// Gateway error response
#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayError {
    #[schema(example = "Failed to process request.")]
    pub error: String,
}

/// Summarize a topic on behalf of the front-end.
///
/// Every failure, including a malformed body, collapses to a single 500.
#[utoipa::path(
    post,
    path = "/api/process-topic",
    tag = "gateway",
    request_body = TopicRequest,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 500, description = "Request failed", body = GatewayError)
    )
)]
pub async fn process_topic(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TopicRequest>, JsonRejection>,
) -> Response {
    state.increment_requests();

    let result = match payload {
        Ok(Json(request)) => state
            .pipeline
            .summarize_web(&request.topic)
            .await
            .map_err(|e| e.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };

    match result {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "Gateway request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GatewayError {
                    error: GATEWAY_FAILURE.to_string(),
                }),
            )
                .into_response()
        }
    }
}
