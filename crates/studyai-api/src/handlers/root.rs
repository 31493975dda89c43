//! Service root

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Fixed message returned by the root endpoint
pub const ONLINE_MESSAGE: &str = "AI service is online!";

/// Root response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "AI service is online!")]
    pub message: String,
}

/// Verify the service is running
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is online", body = MessageResponse)
    )
)]
pub async fn read_root(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.increment_requests();

    Json(MessageResponse {
        message: ONLINE_MESSAGE.to_string(),
    })
}
